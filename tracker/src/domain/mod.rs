//! Domain: entities and the store they live in.

pub mod entity;
pub mod memory;
pub mod repository;

pub use entity::{Account, Activity, ActivityType, AuthAccount, Credentials, NewAccount, NewActivity};
pub use memory::MemoryStore;
pub use repository::{Store, StoreError};
