//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by the `accounts.email` unique constraint, so
//! two concurrent registrations for one address cannot both succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, DisplayName, EmailAddress, PasswordHash, Role};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    map_basic_pool_error(error, AccountRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    map_basic_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let corrupt =
        |field: &str| AccountRepositoryError::query(format!("stored account has invalid {field}"));
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        name: DisplayName::new(row.name).map_err(|_| corrupt("name"))?,
        email: EmailAddress::new(row.email).map_err(|_| corrupt("email"))?,
        password_hash: PasswordHash::new(row.password_hash)
            .map_err(|_| corrupt("password hash"))?,
        role: row.role.parse::<Role>().map_err(|_| corrupt("role"))?,
    })
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAccountRow {
            id: *account.id.as_uuid(),
            name: account.name.as_ref(),
            email: account.email.as_ref(),
            password_hash: account.password_hash.as_str(),
            role: account.role.as_str(),
        };

        diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    AccountRepositoryError::duplicate_email(account.email.to_string())
                } else {
                    map_diesel_error(error)
                }
            })?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::email.eq(email))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn display_names(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, DisplayName>, AccountRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(uuid::Uuid, String)> = accounts::table
            .filter(accounts::id.eq_any(&uuids))
            .select((accounts::id, accounts::name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(id, name)| {
                DisplayName::new(name)
                    .map(|name| (AccountId::from_uuid(id), name))
                    .map_err(|_| AccountRepositoryError::query("stored account has invalid name"))
            })
            .collect()
    }
}
