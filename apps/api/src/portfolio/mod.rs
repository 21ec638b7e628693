pub mod data;
pub mod handlers;
pub mod settings;
pub mod templates;
