//! Application state shared across handlers.

use axum::extract::FromRef;

use crate::auth::{AuthorizationGate, CredentialVerifier};
use crate::store::Store;

/// Cross-origin settings for the router.
#[derive(Debug, Clone, Default)]
pub struct CorsSettings {
    /// Origins allowed to call the API. Entries match exactly or as a prefix.
    pub allowed_origins: Vec<String>,
    /// With no configured origins, allow local development origins.
    pub dev_mode: bool,
}

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub gate: AuthorizationGate,
    pub cors: CorsSettings,
}

impl AppState {
    pub fn new(store: Store, verifier: CredentialVerifier, cors: CorsSettings) -> Self {
        let gate = AuthorizationGate::new(verifier, store.clone());
        Self { store, gate, cors }
    }
}

impl FromRef<AppState> for AuthorizationGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}
