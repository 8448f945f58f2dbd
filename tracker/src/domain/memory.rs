//! In-memory `Store`. One lock over all tables; ids are per-table sequences starting at 1.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::entity::{Account, Activity, ActivityType, Credentials, NewAccount, NewActivity};
use super::repository::{Store, StoreError};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Credentials>,
    activity_types: BTreeMap<i64, ActivityType>,
    activities: BTreeMap<i64, Activity>,
    /// (account_id, activity_id)
    participants: Vec<(i64, i64)>,
    last_account_id: i64,
    last_activity_type_id: i64,
    last_activity_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut t = self.write()?;
        if t.accounts.values().any(|c| c.account.email == account.email) {
            return Err(StoreError::DuplicateEmail(account.email));
        }
        t.last_account_id += 1;
        let created = Account {
            id: t.last_account_id,
            name: account.name,
            email: account.email,
        };
        t.accounts.insert(
            created.id,
            Credentials {
                account: created.clone(),
                password_hash: account.password_hash,
            },
        );
        Ok(created)
    }

    fn credentials_by_email(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let t = self.read()?;
        Ok(t.accounts.values().find(|c| c.account.email == email).cloned())
    }

    fn account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.get(&id).map(|c| c.account.clone()))
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.read()?.accounts.values().map(|c| c.account.clone()).collect())
    }

    fn create_activity_type(&self, title: &str) -> Result<ActivityType, StoreError> {
        let mut t = self.write()?;
        t.last_activity_type_id += 1;
        let created = ActivityType {
            id: t.last_activity_type_id,
            title: title.to_owned(),
        };
        t.activity_types.insert(created.id, created.clone());
        Ok(created)
    }

    fn activity_type(&self, id: i64) -> Result<Option<ActivityType>, StoreError> {
        Ok(self.read()?.activity_types.get(&id).cloned())
    }

    fn activity_types(&self) -> Result<Vec<ActivityType>, StoreError> {
        Ok(self.read()?.activity_types.values().cloned().collect())
    }

    fn create_activity(&self, activity: NewActivity) -> Result<Activity, StoreError> {
        let mut t = self.write()?;
        if !t.activity_types.contains_key(&activity.type_id) {
            return Err(StoreError::UnknownActivityType(activity.type_id));
        }
        t.last_activity_id += 1;
        let created = Activity {
            id: t.last_activity_id,
            title: activity.title,
            type_id: activity.type_id,
            owner_id: activity.owner_id,
        };
        t.activities.insert(created.id, created.clone());
        t.participants.push((created.owner_id, created.id));
        Ok(created)
    }

    fn activity(&self, id: i64) -> Result<Option<Activity>, StoreError> {
        Ok(self.read()?.activities.get(&id).cloned())
    }

    fn activities(&self) -> Result<Vec<Activity>, StoreError> {
        Ok(self.read()?.activities.values().cloned().collect())
    }

    fn delete_activity(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.write()?;
        if t.activities.remove(&id).is_none() {
            return Ok(false);
        }
        t.participants.retain(|&(_, activity_id)| activity_id != id);
        Ok(true)
    }

    fn participants(&self, activity_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(self
            .read()?
            .participants
            .iter()
            .filter(|&&(_, id)| id == activity_id)
            .map(|&(account_id, _)| account_id)
            .collect())
    }
}
