//! # テスト用モックリポジトリ
//!
//! ユースケーステストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! kiban-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiban_domain::{
    token::{AccessToken, AccessTokenId},
    user::{Email, User, UserId},
};

use crate::{
    error::InfraError,
    repository::{AccessTokenRepository, UserRepository},
};

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), InfraError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }
}

// ===== MockAccessTokenRepository =====

#[derive(Clone, Default)]
pub struct MockAccessTokenRepository {
    tokens: Arc<Mutex<Vec<AccessToken>>>,
}

impl MockAccessTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_token(&self, token: AccessToken) {
        self.tokens.lock().unwrap().push(token);
    }

    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl AccessTokenRepository for MockAccessTokenRepository {
    async fn create(&self, token: &AccessToken) -> Result<(), InfraError> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccessTokenId) -> Result<Option<AccessToken>, InfraError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id() == id)
            .cloned())
    }

    async fn deactivate(&self, id: &AccessTokenId) -> Result<(), InfraError> {
        let mut tokens = self.tokens.lock().unwrap();
        if let Some(token) = tokens.iter_mut().find(|t| t.id() == id) {
            *token = AccessToken::from_db(
                *token.id(),
                *token.user_id(),
                token.expires_at(),
                false,
                token.ip_address().map(ToOwned::to_owned),
                token.created_at(),
                token.updated_at(),
            );
        }
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, InfraError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| !t.is_expired(now));
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<u64, InfraError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.is_active() || t.updated_at() >= cutoff);
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use kiban_domain::{password::PasswordHash, role::Role};

    use super::*;

    fn test_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn create_test_user(email: &str) -> User {
        User::new(
            UserId::new(),
            Email::new(email).unwrap(),
            PasswordHash::new("$argon2id$v=19$..."),
            Role::Member,
            test_now(),
        )
    }

    #[tokio::test]
    async fn test_mock_user_repositoryで検索できる() {
        let repo = MockUserRepository::new();
        let user = create_test_user("user@example.com");
        repo.create(&user).await.unwrap();

        let found = repo
            .find_by_email(&Email::new("user@example.com").unwrap())
            .await
            .unwrap();
        assert!(found.is_some());

        let found = repo.find_by_id(user.id()).await.unwrap();
        assert!(found.is_some());

        let missing = repo
            .find_by_email(&Email::new("other@example.com").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_mock_token_repositoryのdeactivateで失効する() {
        let repo = MockAccessTokenRepository::new();
        let now = test_now();
        let token = AccessToken::new(
            AccessTokenId::new(),
            UserId::new(),
            now + Duration::minutes(30),
            None,
            now,
        );
        repo.create(&token).await.unwrap();

        repo.deactivate(token.id()).await.unwrap();

        let found = repo.find_by_id(token.id()).await.unwrap().unwrap();
        assert!(!found.is_active());
    }

    #[tokio::test]
    async fn test_mock_token_repositoryのdelete_expiredが期限切れのみ削除する() {
        let repo = MockAccessTokenRepository::new();
        let now = test_now();
        let expired = AccessToken::new(
            AccessTokenId::new(),
            UserId::new(),
            now - Duration::minutes(1),
            None,
            now - Duration::minutes(31),
        );
        let valid = AccessToken::new(
            AccessTokenId::new(),
            UserId::new(),
            now + Duration::minutes(30),
            None,
            now,
        );
        repo.create(&expired).await.unwrap();
        repo.create(&valid).await.unwrap();

        let deleted = repo.delete_expired(now).await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(repo.token_count(), 1);
        assert!(repo.find_by_id(valid.id()).await.unwrap().is_some());
    }
}
