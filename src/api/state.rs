//! Application state for shared services

use std::sync::Arc;

use crate::domain::Authenticator;

/// Application state assembled once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}
