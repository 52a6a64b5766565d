use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::message::Role;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UiSettings {
    pub ui_scale: f32,

    // Role → bubble colour
    pub bubble_colors: HashMap<String, [u8; 4]>,
}

impl Default for UiSettings {
    fn default() -> Self {
        let mut bubble_colors = HashMap::new();

        bubble_colors.insert(role_key(Role::User).into(), [40, 70, 120, 255]);
        bubble_colors.insert(role_key(Role::Assistant).into(), [40, 90, 60, 255]);

        Self {
            ui_scale: 1.0,
            bubble_colors,
        }
    }
}

impl UiSettings {
    pub fn color(&self, role: Role) -> Color32 {
        self.bubble_colors
            .get(role_key(role))
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, role: Role, color: Color32) {
        self.bubble_colors.insert(
            role_key(role).to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }
}

fn role_key(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Assistant => "assistant",
        Role::User => "user",
    }
}
