use std::sync::Arc;
use crate::auth::TokenVerifier;
use crate::store::MetricsStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetricsStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}
