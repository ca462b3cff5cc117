//! # AccessTokenRepository
//!
//! 発行済みアクセストークンレコードの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **失効は論理削除**: ログアウトは `is_active = false` への更新
//! - **棚卸しは物理削除**: 期限切れ・古い失効済みレコードは
//!   クリーンアップタスクが削除する

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiban_domain::{
    token::{AccessToken, AccessTokenId},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// アクセストークンリポジトリトレイト
///
/// トークンレコードの永続化操作を定義する。
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// トークンレコードを作成
    async fn create(&self, token: &AccessToken) -> Result<(), InfraError>;

    /// ID でトークンレコードを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(token))`: レコードが見つかった場合
    /// - `Ok(None)`: レコードが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_id(&self, id: &AccessTokenId) -> Result<Option<AccessToken>, InfraError>;

    /// トークンレコードを失効させる
    ///
    /// 該当レコードが存在しない場合も成功とみなす（冪等）。
    async fn deactivate(&self, id: &AccessTokenId) -> Result<(), InfraError>;

    /// 期限切れトークンを削除する
    ///
    /// # 戻り値
    ///
    /// 削除した行数
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, InfraError>;

    /// 指定日時より前に失効した古いトークンを削除する
    ///
    /// # 戻り値
    ///
    /// 削除した行数
    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<u64, InfraError>;
}

/// access_tokens テーブルの行型
#[derive(Debug, sqlx::FromRow)]
struct AccessTokenRow {
    id:         Uuid,
    user_id:    Uuid,
    expires_at: DateTime<Utc>,
    is_active:  bool,
    ip_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccessTokenRow {
    fn into_domain(self) -> AccessToken {
        AccessToken::from_db(
            AccessTokenId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            self.expires_at,
            self.is_active,
            self.ip_address,
            self.created_at,
            self.updated_at,
        )
    }
}

/// PostgreSQL 実装の AccessTokenRepository
#[derive(Debug, Clone)]
pub struct PostgresAccessTokenRepository {
    pool: PgPool,
}

impl PostgresAccessTokenRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessTokenRepository for PostgresAccessTokenRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(token_id = %token.id()))]
    async fn create(&self, token: &AccessToken) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens
                (id, user_id, expires_at, is_active, ip_address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id().as_uuid())
        .bind(token.user_id().as_uuid())
        .bind(token.expires_at())
        .bind(token.is_active())
        .bind(token.ip_address())
        .bind(token.created_at())
        .bind(token.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &AccessTokenId) -> Result<Option<AccessToken>, InfraError> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT
                id,
                user_id,
                expires_at,
                is_active,
                ip_address,
                created_at,
                updated_at
            FROM access_tokens
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccessTokenRow::into_domain))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn deactivate(&self, id: &AccessTokenId) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE access_tokens
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, InfraError> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<u64, InfraError> {
        let result = sqlx::query(
            r#"
            DELETE FROM access_tokens
            WHERE is_active = FALSE AND updated_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
