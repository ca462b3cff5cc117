//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **実行時バインド**: `query_as` + `FromRow` により、ビルド環境に
//!   データベースを要求しない
//! - **ドメイン変換**: 行型（`UserRow`）からエンティティへの変換を
//!   リポジトリ内に閉じ込める

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiban_domain::{
    password::PasswordHash,
    role::Role,
    user::{Email, User, UserId},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
///
/// ユーザー情報の永続化操作を定義する。
/// インフラ層で具体的な実装を提供し、ユースケース層から利用する。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// メールアドレスでユーザーを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError>;

    /// ID でユーザーを検索
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError>;

    /// ユーザーを登録
    ///
    /// メールアドレスの一意制約はユースケース層の事前チェックに加えて
    /// データベースの UNIQUE 制約でも保証される。
    async fn create(&self, user: &User) -> Result<(), InfraError>;
}

/// users テーブルの行型
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id:            Uuid,
    email:         String,
    password_hash: String,
    role:          String,
    is_active:     bool,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl UserRow {
    /// 行をドメインエンティティに変換する
    ///
    /// DB の値がドメインの制約を満たさない場合は `InvalidData` を返す。
    fn into_domain(self) -> Result<User, InfraError> {
        let email = Email::new(&self.email)
            .map_err(|e| InfraError::invalid_data(format!("不正なメールアドレス: {e}")))?;
        let role = Role::from_str(&self.role)
            .map_err(|_| InfraError::invalid_data(format!("不正なロール: {}", self.role)))?;

        Ok(User::from_db(
            UserId::from_uuid(self.id),
            email,
            PasswordHash::new(self.password_hash),
            role,
            self.is_active,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        email,
        password_hash,
        role,
        is_active,
        created_at,
        updated_at
    FROM users
"#;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_COLUMNS} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_domain).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_domain).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(user_id = %user.id()))]
    async fn create(&self, user: &User) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.password_hash().as_str())
        .bind(user.role().to_string())
        .bind(user.is_active())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
