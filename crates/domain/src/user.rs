//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`User`] | ユーザー | 認証の主体。メールアドレスとパスワードハッシュを保持 |
//! | [`Email`] | メールアドレス | ログイン ID。小文字に正規化して一意管理 |
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: UserId は UUID をラップし、型安全性を確保
//! - **不変性**: エンティティフィールドは基本的に不変、変更はメソッド経由
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kiban_domain::{
//!     password::PasswordHash,
//!     role::Role,
//!     user::{Email, User, UserId},
//! };
//!
//! let user = User::new(
//!     UserId::new(),
//!     Email::new("user@example.com")?,
//!     PasswordHash::new("$argon2id$v=19$..."),
//!     Role::Member,
//!     chrono::Utc::now(),
//! );
//!
//! assert!(user.is_active());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};

use crate::{DomainError, password::PasswordHash, role::Role};

define_uuid_id! {
    /// ユーザー ID（一意識別子）
    ///
    /// UUID v7 を使用し、生成順にソート可能。
    pub struct UserId;
}

/// メールアドレス（値オブジェクト）
///
/// ログイン ID として使用する。生成時にバリデーションと小文字への
/// 正規化を実行し、不正な値や表記ゆれの混入を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式（両側が空でない）
    /// - 最大 255 文字
    ///
    /// 大文字は小文字に正規化される。
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_lowercase();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        // 基本的な構造検証: local@domain の形式であること
        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーエンティティ
///
/// 認証の主体。パスワードハッシュを保持するが、ハッシュ値そのものは
/// API レスポンスには含めない（api 層の責務）。
#[derive(Debug, Clone)]
pub struct User {
    id:            UserId,
    email:         Email,
    password_hash: PasswordHash,
    role:          Role,
    is_active:     bool,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl User {
    /// 新規ユーザーを作成する
    ///
    /// 作成直後のユーザーはアクティブ状態になる。
    pub fn new(
        id: UserId,
        email: Email,
        password_hash: PasswordHash,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// 永続化層からエンティティを復元する
    ///
    /// バリデーション済みの値を前提とするため、検証は行わない。
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: UserId,
        email: Email,
        password_hash: PasswordHash,
        role: Role,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            role,
            is_active,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// アカウントが有効かどうかを返す
    ///
    /// 無効化されたユーザーはログインも認証済み操作もできない。
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
