//! Google sign-in and session handling.

pub mod handlers;
pub mod oauth;
pub mod session;
pub mod state_store;
