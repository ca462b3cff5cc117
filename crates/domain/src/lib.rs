//! # Kiban ドメイン層
//!
//! 認証・認可ドメインの中核を担うドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: [`user::User`],
//!   [`token::AccessToken`]）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例:
//!   [`user::Email`], [`password::PlainPassword`]）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain → shared
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//! これにより、ビジネスロジックの純粋性が保たれる。
//!
//! ## 使用例
//!
//! ```rust
//! use kiban_domain::{DomainError, user::Email};
//!
//! let email = Email::new("User@Example.com").unwrap();
//! assert_eq!(email.as_str(), "user@example.com");
//!
//! let error = DomainError::NotFound {
//!     entity_type: "User",
//!     id:          "u-123".to_string(),
//! };
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod password;
pub mod role;
pub mod token;
pub mod user;

pub use error::DomainError;
