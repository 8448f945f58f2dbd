//! Tracker: accounts, activities and activity types over the `tracker-core` router.

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod domain;

pub use api::AppState;
pub use auth::{AccountAuthenticator, Argon2Hasher, Claims, PasswordError, PasswordHasher, TokenError, TokenService};
pub use config::{Config, ConfigError};
pub use self::core::{build_router, ApiError, Application};
pub use domain::{Account, Activity, ActivityType, AuthAccount, MemoryStore, Store, StoreError};
