use std::path::PathBuf;

use crate::model::message::Message;

pub enum EngineCommand {
    UserInput(String),
    ClearConversation,
    ReloadCatalog(PathBuf),
    TestConnection,
}

pub enum EngineResponse {
    /// Messages to show, system prompt excluded.
    FullMessageHistory(Vec<Message>),

    TurnFailed {
        reason: String,
    },

    CatalogReloaded {
        dir: PathBuf,
    },

    CatalogReloadFailed {
        reason: String,
    },

    ConnectionStatus(String),
}
