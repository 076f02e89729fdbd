//! Shared application state

use std::sync::Arc;
use crate::status::StatusService;

#[derive(Clone)]
pub struct AppState {
    pub status: Arc<StatusService>,
}

impl AppState {
    pub fn new(status: Arc<StatusService>) -> Self {
        Self { status }
    }
}
