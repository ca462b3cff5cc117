//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックは usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `auth`: 認証関連（register, token, logout, me）
//! - `health`: ヘルスチェック（liveness / readiness）
//! - `misc`: ping、サービス情報

pub mod auth;
pub mod health;
pub mod misc;

pub use auth::{AuthState, login, logout, me, register};
pub use health::{ReadinessState, health_check, readiness_check};
pub use misc::{info, ping};
