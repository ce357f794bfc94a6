use crate::{config::Config, session::SessionRegistry, store::Gateway};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub config: Config,
    pub sessions: SessionRegistry,
}

impl FromRef<AppState> for Gateway {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
