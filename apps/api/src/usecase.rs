//! # ユースケース層
//!
//! API のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - ハンドラはユースケーストレイト経由でロジックを呼び出す
//! - リポジトリ・パスワードハッシュ・時刻はすべてトレイト経由で注入し、
//!   テストではモック実装に差し替える
//!
//! ## モジュール構成
//!
//! - [`auth`]: 登録・ログイン・ログアウト・認証済みユーザー取得
//! - [`token`]: JWT の発行・検証・失効
//! - [`cleanup`]: トークンの定期棚卸しタスク

pub mod auth;
pub mod cleanup;
pub mod token;

pub use auth::{AuthUseCase, AuthUseCaseImpl};
pub use cleanup::TokenCleanupTask;
pub use token::{TokenUseCase, TokenUseCaseImpl, VerifiedToken};
