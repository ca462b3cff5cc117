//! # リポジトリ実装
//!
//! ユーザー・アクセストークンの永続化操作を定義し、PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: トレイトをここで定義し、ユースケース層はトレイト経由で利用
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計（[`crate::mock`] 参照）

pub mod access_token_repository;
pub mod user_repository;

pub use access_token_repository::{AccessTokenRepository, PostgresAccessTokenRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
