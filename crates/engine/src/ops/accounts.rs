//! Account provisioning and lookup.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{Account, EngineError, ResultEngine, accounts};

use super::{Engine, with_tx};

fn normalize_username(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl Engine {
    /// Creates an account with zero balance and points.
    pub async fn create_account(&self, username: &str, password: &str) -> ResultEngine<Account> {
        let username = normalize_username(username)?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::Username.eq(username.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(username));
            }
            let account = Account::new(username.clone(), Utc::now());
            let mut model = accounts::ActiveModel::from(&account);
            model.password = ActiveValue::Set(password.to_string());
            model.insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Returns an account by id.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }
}
