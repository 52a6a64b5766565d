pub mod catalog;
pub mod message;
