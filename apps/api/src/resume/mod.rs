pub mod handlers;
pub mod store;
pub mod upload;
