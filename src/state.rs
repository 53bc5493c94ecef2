use crate::{config::Config, tools::Dispatcher};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub config: Config,
}

impl FromRef<AppState> for Dispatcher {
    fn from_ref(state: &AppState) -> Self {
        state.dispatcher.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
