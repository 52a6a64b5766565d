mod config;
mod engine;
mod logging;
mod model;
mod ui;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use crate::engine::catalog_loader::load_catalog;
use crate::engine::conversation::Conversation;
use crate::engine::engine::Session;
use crate::engine::llm_client::{CompletionParams, OpenAiClient};
use crate::engine::prompt_builder::lima_timestamp;

fn main() -> anyhow::Result<()> {
    logging::init();

    let config_dir = config::app_config_dir();
    let config = config::load_config(&config_dir.join(config::CONFIG_FILE))?;
    let api_key = config::resolve_api_key(&config_dir.join(config::SECRETS_FILE))?;

    let catalog = load_catalog(&config.catalog_dir).context("loading catalog")?;
    let timestamp = lima_timestamp(Utc::now());
    let conversation =
        Conversation::initialize(&catalog, &config.shop.pickup_address, &timestamp);
    info!(
        %timestamp,
        model = %config.completion.model,
        prompt_chars = conversation.system_prompt().chars().count(),
        "session initialised"
    );

    let session = Session {
        conversation,
        backend: OpenAiClient::new(config.completion.api_base.clone(), api_key),
        params: CompletionParams::from(&config.completion),
        pickup_address: config.shop.pickup_address.clone(),
    };
    let settings = ui::settings_io::load_settings();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "SazónBot",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ui::app::SazonApp::new(&cc.egui_ctx, session, settings)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
