//! # Kiban 共有ユーティリティ
//!
//! このクレートは、Kiban スターターキット全体で使用される
//! 共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, api）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（observability 関連は
//!   `observability` feature の背後に置く）

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod error_response;
pub mod health;
pub mod observability;

#[cfg(feature = "observability")]
pub use canonical_log::CanonicalLogLineLayer;
pub use error_response::ErrorResponse;
pub use health::HealthResponse;
