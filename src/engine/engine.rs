use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};

use chrono::Utc;
use tracing::{info, warn};

use crate::engine::catalog_loader::load_catalog;
use crate::engine::conversation::Conversation;
use crate::engine::llm_client::{complete, CompletionBackend, CompletionParams};
use crate::engine::prompt_builder::lima_timestamp;
use crate::engine::protocol::{EngineCommand, EngineResponse};

/// Everything one chat window owns.
pub struct Session<B> {
    pub conversation: Conversation,
    pub backend: B,
    pub params: CompletionParams,
    pub pickup_address: String,
}

/// Called after every response so the UI wakes up and draws it.
pub type Notify = Box<dyn Fn() + Send>;

/// Worker that owns the session and serves UI commands one at a time.
pub struct Engine<B> {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    notify: Notify,
    session: Session<B>,
}

impl<B: CompletionBackend> Engine<B> {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        session: Session<B>,
        notify: Notify,
    ) -> Self {
        Self {
            rx,
            tx,
            notify,
            session,
        }
    }

    pub fn run(&mut self) {
        self.send_history();

        while let Ok(cmd) = self.rx.recv() {
            self.handle(cmd);
        }

        info!("engine stopped");
    }

    pub fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::UserInput(text) => {
                let result = complete(
                    &mut self.session.conversation,
                    &self.session.backend,
                    &text,
                    &self.session.params,
                );

                if let Err(e) = result {
                    warn!(error = %e, "completion failed");
                    self.send(EngineResponse::TurnFailed {
                        reason: e.to_string(),
                    });
                }

                self.send_history();
            }

            EngineCommand::ClearConversation => {
                self.session.conversation.reset();
                info!("conversation cleared");
                self.send_history();
            }

            EngineCommand::ReloadCatalog(dir) => self.reload_catalog(&dir),

            EngineCommand::TestConnection => {
                let status = match self.session.backend.test_connection() {
                    Ok(status) => status,
                    Err(e) => {
                        warn!(error = %e, "connection test failed");
                        format!("Sin conexión: {e}")
                    }
                };
                self.send(EngineResponse::ConnectionStatus(status));
            }
        }
    }

    fn reload_catalog(&mut self, dir: &Path) {
        match load_catalog(dir) {
            Ok(catalog) => {
                let timestamp = lima_timestamp(Utc::now());
                self.session.conversation =
                    Conversation::initialize(&catalog, &self.session.pickup_address, &timestamp);

                self.send(EngineResponse::CatalogReloaded {
                    dir: dir.to_path_buf(),
                });
                self.send_history();
            }
            Err(e) => {
                warn!(error = %e, "catalog reload failed, keeping current session");
                self.send(EngineResponse::CatalogReloadFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn send_history(&self) {
        let visible = self.session.conversation.visible().cloned().collect();
        self.send(EngineResponse::FullMessageHistory(visible));
    }

    fn send(&self, resp: EngineResponse) {
        if self.tx.send(resp).is_ok() {
            (self.notify)();
        }
    }
}
