//! # ヘルスチェック共通型
//!
//! Liveness / Readiness エンドポイントで使用されるレスポンス型を提供する。
//!
//! - Liveness（`/health`）: プロセスが生きているかのみを返す
//! - Readiness（`/health/ready`）: 依存サービス（データベース等）への
//!   接続状態を個別チェックとして返す

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// ヘルスチェック（Liveness）レスポンス
///
/// `status` は常に `"healthy"`（プロセスが応答できている時点で生存している）、
/// `version` は Cargo.toml のバージョンを示す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 稼働状態（`"healthy"`）
    pub status:  String,
    /// アプリケーションバージョン（Cargo.toml から取得）
    pub version: String,
    /// 人間向けの補足メッセージ
    pub message: String,
}

impl HealthResponse {
    /// 稼働中を表すレスポンスを作成する
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status:  "healthy".to_string(),
            version: version.into(),
            message: "Service is running".to_string(),
        }
    }
}

/// 個別チェックの結果ステータス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// チェック成功
    Ok,
    /// チェック失敗
    Error,
}

/// Readiness 全体のステータス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    /// 全依存サービスが利用可能
    Ready,
    /// 一部の依存サービスが利用不可
    NotReady,
}

/// Readiness Check レスポンス
///
/// 依存サービスへの接続状態を含むレスポンス型。
/// `status` は全体のステータス、`checks` は個別チェック結果を示す。
///
/// ## 使用例
///
/// ```
/// use std::collections::HashMap;
///
/// use kiban_shared::health::{CheckStatus, ReadinessResponse, ReadinessStatus};
///
/// let mut checks = HashMap::new();
/// checks.insert("database".to_string(), CheckStatus::Ok);
/// let response = ReadinessResponse {
///     status: ReadinessStatus::Ready,
///     checks,
/// };
/// assert_eq!(response.status, ReadinessStatus::Ready);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// 全体のステータス
    pub status: ReadinessStatus,
    /// 個別チェック結果（キー: チェック名、値: ステータス）
    pub checks: HashMap<String, CheckStatus>,
}
