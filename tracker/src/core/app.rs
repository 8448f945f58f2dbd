//! Application: wires config, store, hasher and token service into a router and runs it.

use std::sync::Arc;

use tracker_core::{Router, RouterError};

use super::routing::build_router;
use crate::api::AppState;
use crate::auth::{Argon2Hasher, PasswordHasher, TokenService};
use crate::config::Config;
use crate::domain::{MemoryStore, Store};

pub struct Application {
    config: Config,
    state: AppState,
}

impl Application {
    /// In-memory store, Argon2 hashing, tokens signed per `config.auth`.
    pub fn new(config: Config) -> Self {
        let state = AppState {
            store: Arc::new(MemoryStore::new()),
            tokens: Arc::new(TokenService::new(&config.auth)),
            hasher: Arc::new(Argon2Hasher::new()),
        };
        Self { config, state }
    }

    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.state.store = store;
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.state.hasher = hasher;
        self
    }

    pub fn router(&self) -> Result<Router, RouterError> {
        build_router(self.state.clone(), self.config.router.tie_break)
    }

    /// Bind `server.host:server.port` and serve until Ctrl-C (blocks).
    pub fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let router = self.router()?;
        tracker_core::http::run(router, &self.config.server.host, self.config.server.port)
    }
}
