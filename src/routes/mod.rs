pub mod api;

use std::sync::Arc;

use crate::collectors::runner::Pipeline;
use crate::store::JobStore;

/// Shared state for every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub pipeline: Arc<Pipeline>,
}
