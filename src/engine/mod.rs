pub mod engine;
pub mod protocol;

pub mod catalog_loader;
pub mod conversation;
pub mod llm_client;
pub mod prompt_builder;
