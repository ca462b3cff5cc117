//! # アクセストークン
//!
//! JWT に対応するサーバー側トークンレコードのドメインモデル。
//!
//! ## 設計方針
//!
//! JWT 自体はステートレスだが、ログアウト（失効）を実現するために
//! 発行済みトークンをレコードとして永続化する。JWT の `sub` クレームが
//! このレコードの ID を指し、検証時にレコードの有効性を確認する。
//!
//! | 状態 | 意味 |
//! |------|------|
//! | `is_active = true` かつ期限内 | 有効。認証に使用できる |
//! | `is_active = false` | ログアウト等で失効済み |
//! | `expires_at` 超過 | 期限切れ。クリーンアップタスクの削除対象 |

use chrono::{DateTime, Utc};

use crate::user::UserId;

define_uuid_id! {
    /// アクセストークンレコードの一意識別子
    ///
    /// JWT の `sub` クレームに格納される。
    pub struct AccessTokenId;
}

/// アクセストークンレコード
///
/// 発行済み JWT のサーバー側レコード。失効判定と棚卸しに使用する。
#[derive(Debug, Clone)]
pub struct AccessToken {
    id:         AccessTokenId,
    user_id:    UserId,
    expires_at: DateTime<Utc>,
    is_active:  bool,
    ip_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccessToken {
    /// 新規トークンレコードを作成する
    ///
    /// 作成直後のトークンはアクティブ状態になる。
    pub fn new(
        id: AccessTokenId,
        user_id: UserId,
        expires_at: DateTime<Utc>,
        ip_address: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            expires_at,
            is_active: true,
            ip_address,
            created_at: now,
            updated_at: now,
        }
    }

    /// 永続化層からエンティティを復元する
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: AccessTokenId,
        user_id: UserId,
        expires_at: DateTime<Utc>,
        is_active: bool,
        ip_address: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            expires_at,
            is_active,
            ip_address,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &AccessTokenId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// 失効済みでないかを返す
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 指定時刻時点で期限切れかを判定する
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// 指定時刻時点で認証に使用できるかを判定する
    ///
    /// アクティブかつ期限内であること。
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}
