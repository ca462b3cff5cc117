//! # Kiban インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはリポジトリトレイトの具体的な実装を提供する。
//! 外部システムの詳細をカプセル化し、ドメイン層をインフラの変更から保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **リポジトリ実装**: ユーザー・アクセストークンの永続化
//! - **パスワードハッシュ**: Argon2id によるハッシュ生成と検証
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain → shared
//! ```
//!
//! インフラ層は `domain` に依存する。
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`password`] - Argon2id パスワードハッシュ
//! - [`repository`] - リポジトリ実装
//! - [`mock`] - テスト用インメモリリポジトリ（`test-utils` feature）

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod password;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
pub use password::{Argon2PasswordHasher, PasswordHasher};
