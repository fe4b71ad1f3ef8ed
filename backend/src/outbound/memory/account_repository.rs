//! Mutex-guarded account directory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, DisplayName};

use super::poisoned;

#[derive(Debug, Default)]
struct Directory {
    by_id: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
}

/// Account repository holding every account in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    directory: Mutex<Directory>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_directory<T>(
        &self,
        f: impl FnOnce(&mut Directory) -> Result<T, AccountRepositoryError>,
    ) -> Result<T, AccountRepositoryError> {
        let mut guard = self
            .directory
            .lock()
            .map_err(|_| AccountRepositoryError::query(poisoned("account directory")))?;
        f(&mut guard)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        self.with_directory(|directory| {
            let email = account.email.as_ref();
            if directory.by_email.contains_key(email) {
                return Err(AccountRepositoryError::duplicate_email(email));
            }
            directory.by_email.insert(email.to_owned(), account.id);
            directory.by_id.insert(account.id, account.clone());
            Ok(())
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError> {
        self.with_directory(|directory| {
            Ok(directory
                .by_email
                .get(email)
                .and_then(|id| directory.by_id.get(id))
                .cloned())
        })
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        self.with_directory(|directory| Ok(directory.by_id.get(id).cloned()))
    }

    async fn display_names(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, DisplayName>, AccountRepositoryError> {
        self.with_directory(|directory| {
            Ok(ids
                .iter()
                .filter_map(|id| {
                    directory
                        .by_id
                        .get(id)
                        .map(|account| (*id, account.name.clone()))
                })
                .collect())
        })
    }
}
