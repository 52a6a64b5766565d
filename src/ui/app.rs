use eframe::egui;
use egui::Layout;
use std::sync::mpsc;
use std::time::Duration;
use tracing::info;

use crate::engine::engine::{Engine, Notify, Session};
use crate::engine::llm_client::CompletionBackend;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::model::message::{Message, Role};
use crate::ui::center_panel::draw_center_panel;
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::save_settings;

const INTRO: &str = "¡Bienvenido a Sazón Bot, el lugar donde todos tus antojos de almuerzo se hacen realidad!\n\
Comienza a chatear con Sazón Bot y descubre qué puedes pedir, cuánto cuesta y cómo realizar tu pago. \
¡Estamos aquí para ayudarte a disfrutar del mejor almuerzo!";

const ASSISTANT_AVATAR: &str = "👨‍🍳";
const USER_AVATAR: &str = "👤";

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub(crate) struct UiState {
    pub(crate) input_text: String,
    pub(crate) rendered_messages: Vec<Message>,

    /// A user turn is with the engine; input stays locked until it answers.
    pub(crate) pending: bool,
    pub(crate) should_auto_scroll: bool,
    pub(crate) show_options: bool,

    pub(crate) status: Option<String>,
    pub(crate) error: Option<String>,
}

/* =========================
   App
   ========================= */

pub struct SazonApp {
    pub(crate) ui: UiState,
    settings: UiSettings,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl SazonApp {
    pub fn new<B>(ctx: &egui::Context, session: Session<B>, settings: UiSettings) -> Self
    where
        B: CompletionBackend + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let repaint_ctx = ctx.clone();
        let notify: Notify = Box::new(move || repaint_ctx.request_repaint());

        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, session, notify);
            engine.run();
        });

        Self {
            ui: UiState::default(),
            settings,
            cmd_tx,
            resp_rx,
        }
    }

    pub(crate) fn send_command(&mut self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.ui.pending = false;
            self.ui.error = Some("El motor de conversación se detuvo.".into());
        }
    }

    pub(crate) fn submit_input(&mut self) {
        let text = self.ui.input_text.trim().to_string();
        if text.is_empty() || self.ui.pending {
            return;
        }

        // Shown right away; the engine's history replaces it.
        self.ui.rendered_messages.push(Message::user(text.clone()));
        self.ui.input_text.clear();
        self.ui.pending = true;
        self.ui.error = None;
        self.ui.should_auto_scroll = true;

        self.send_command(EngineCommand::UserInput(text));
    }

    pub(crate) fn draw_message(&self, ui: &mut egui::Ui, msg: &Message) {
        let (right, avatar) = match msg.role {
            Role::User => (true, USER_AVATAR),
            Role::Assistant | Role::System => (false, ASSISTANT_AVATAR),
        };
        let text = format!("{avatar}  {}", msg.content);
        let bg = self.settings.color(msg.role);

        ui.add_space(6.0);

        if right {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, bg, &text);
            });
        } else {
            bubble(ui, bg, &text);
        }
    }

    fn drain_responses(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::FullMessageHistory(msgs) => {
                    self.ui.rendered_messages = msgs;
                    self.ui.pending = false;
                    self.ui.should_auto_scroll = true;
                }
                EngineResponse::TurnFailed { reason } => {
                    self.ui.error = Some(format!("No se pudo obtener respuesta: {reason}"));
                }
                EngineResponse::CatalogReloaded { dir } => {
                    self.ui.status = Some(format!("Carta cargada desde {}", dir.display()));
                    self.ui.error = None;
                }
                EngineResponse::CatalogReloadFailed { reason } => {
                    self.ui.error = Some(format!("No se pudo cargar la carta: {reason}"));
                }
                EngineResponse::ConnectionStatus(status) => {
                    self.ui.status = Some(status);
                }
            }
        }
    }

    fn draw_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("🍲 SazónBot");
            ui.label(INTRO);
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Eliminar conversación").clicked() {
                    self.ui.error = None;
                    self.send_command(EngineCommand::ClearConversation);
                }

                if ui.button("Abrir carta…").clicked() {
                    if let Some(dir) = rfd::FileDialog::new()
                        .set_title("Carpeta con la carta")
                        .pick_folder()
                    {
                        info!(dir = %dir.display(), "catalog folder selected");
                        self.send_command(EngineCommand::ReloadCatalog(dir));
                    }
                }

                if ui.button("Probar conexión").clicked() {
                    self.ui.status = Some("Probando conexión…".into());
                    self.send_command(EngineCommand::TestConnection);
                }

                ui.toggle_value(&mut self.ui.show_options, "Opciones");

                if self.ui.pending {
                    ui.spinner();
                }
            });

            if let Some(status) = &self.ui.status {
                ui.label(status);
            }
            if let Some(error) = &self.ui.error {
                ui.colored_label(egui::Color32::LIGHT_RED, error);
            }
        });
    }

    fn draw_options(&mut self, ctx: &egui::Context) {
        let mut open = self.ui.show_options;
        let mut changed = false;

        egui::Window::new("Opciones")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Escala");
                changed |= ui
                    .add(egui::Slider::new(&mut self.settings.ui_scale, 0.75..=2.0))
                    .changed();

                ui.separator();

                for (role, label) in [(Role::Assistant, "Asistente"), (Role::User, "Cliente")] {
                    ui.horizontal(|ui| {
                        let mut color = self.settings.color(role);
                        if ui.color_edit_button_srgba(&mut color).changed() {
                            self.settings.set_color(role, color);
                            changed = true;
                        }
                        ui.label(label);
                    });
                }
            });

        self.ui.show_options = open;
        if changed {
            save_settings(&self.settings);
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for SazonApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        self.drain_responses();

        self.draw_header(ctx);
        if self.ui.show_options {
            self.draw_options(ctx);
        }
        draw_center_panel(ctx, self);

        self.ui.should_auto_scroll = false;

        if self.ui.pending {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/* =========================
   UI Helpers
   ========================= */

fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
