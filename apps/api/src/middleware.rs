//! # ミドルウェア
//!
//! リクエスト処理の横断的関心事を実装する。
//!
//! ## モジュール構成
//!
//! - [`authz`]: Bearer トークン検証と RBAC（最低ロール要求）
//! - [`metrics`]: HTTP メトリクス収集

pub mod authz;
pub mod metrics;

pub use authz::{AuthzState, CurrentUser, require_min_role};
pub use metrics::track_metrics;
