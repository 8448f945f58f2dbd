//! Store: persistence for accounts, activity types, activities and participants.
//! Calls are synchronous; handlers call them inline.

use thiserror::Error;

use super::entity::{Account, Activity, ActivityType, Credentials, NewAccount, NewActivity};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("account with email {0:?} already exists")]
    DuplicateEmail(String),
    #[error("activity type {0} does not exist")]
    UnknownActivityType(i64),
    #[error("store lock poisoned")]
    Poisoned,
}

pub trait Store: Send + Sync {
    fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;
    fn credentials_by_email(&self, email: &str) -> Result<Option<Credentials>, StoreError>;
    fn account(&self, id: i64) -> Result<Option<Account>, StoreError>;
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;

    fn create_activity_type(&self, title: &str) -> Result<ActivityType, StoreError>;
    fn activity_type(&self, id: i64) -> Result<Option<ActivityType>, StoreError>;
    fn activity_types(&self) -> Result<Vec<ActivityType>, StoreError>;

    /// Insert the activity and record its owner as the first participant.
    fn create_activity(&self, activity: NewActivity) -> Result<Activity, StoreError>;
    fn activity(&self, id: i64) -> Result<Option<Activity>, StoreError>;
    fn activities(&self) -> Result<Vec<Activity>, StoreError>;
    /// Returns false if there was nothing to delete. Participants go with it.
    fn delete_activity(&self, id: i64) -> Result<bool, StoreError>;
    fn participants(&self, activity_id: i64) -> Result<Vec<i64>, StoreError>;
}
