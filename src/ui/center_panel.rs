use eframe::egui;

use super::app::SazonApp;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut SazonApp) {
    let input_id = egui::Id::new("chat_input_box");

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        let mut send_now = false;
        let enabled = !app.ui.pending;

        ui.horizontal(|ui| {
            let response = ui.add_enabled(
                enabled,
                egui::TextEdit::singleline(&mut app.ui.input_text)
                    .id(input_id)
                    .hint_text("Escribe tu pedido…")
                    .desired_width(ui.available_width() - 80.0),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }

            if ui.add_enabled(enabled, egui::Button::new("Enviar")).clicked() {
                send_now = true;
            }
        });

        if send_now {
            app.submit_input();

            // Keep cursor focused
            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Chat history ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in &app.ui.rendered_messages {
                    app.draw_message(ui, msg);
                }
            });
    });
}
