//! # その他のハンドラ
//!
//! 疎通確認とサービス情報のエンドポイント。
//!
//! - `GET /v1/ping`: 疎通確認（認証不要）
//! - `GET /api/v1/info`: サービス情報（MEMBER 以上）

use axum::{Extension, Json};
use serde::Serialize;

use crate::middleware::CurrentUser;

/// サービス情報レスポンス
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub service:          String,
    pub version:          String,
    /// リクエストを行ったユーザーのロール
    pub authenticated_as: String,
}

/// GET /v1/ping
///
/// 疎通確認。監視ツールや負荷分散装置からの軽量チェックに使用する。
pub async fn ping() -> &'static str {
    "PONG"
}

/// GET /api/v1/info
///
/// サービス情報を返す。RBAC ミドルウェア（MEMBER 以上）の背後に配置され、
/// 認可が機能していることの確認にも使える。
pub async fn info(Extension(current): Extension<CurrentUser>) -> Json<InfoResponse> {
    Json(InfoResponse {
        service:          env!("CARGO_PKG_NAME").to_string(),
        version:          env!("CARGO_PKG_VERSION").to_string(),
        authenticated_as: current.role.to_string(),
    })
}
