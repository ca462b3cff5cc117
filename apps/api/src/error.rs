//! # API エラー定義
//!
//! API で発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンスボディは [`kiban_shared::ErrorResponse`]（RFC 9457 Problem
//! Details）。401 系のエラーには `WWW-Authenticate: Bearer` ヘッダーを付与する。

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use kiban_domain::{DomainError, role::Role};
use kiban_infra::InfraError;
use kiban_shared::ErrorResponse;
use thiserror::Error;

/// API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 入力値のバリデーション失敗
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// メールアドレスの重複登録
    #[error("既に登録されているメールアドレスです")]
    AlreadyRegistered,

    /// 認証失敗（メールアドレス不明・パスワード不一致を区別しない）
    #[error("認証に失敗しました")]
    AuthenticationFailed,

    /// トークンが無効（署名不正・失効済み・レコードなし）
    #[error("トークンが無効です")]
    TokenInvalid,

    /// トークンの有効期限切れ
    #[error("トークンの有効期限が切れています")]
    TokenExpired,

    /// ロール不足
    #[error("権限が不足しています（必要ロール: {required}）")]
    Forbidden {
        /// 要求された最低ロール
        required: Role,
    },

    /// リソースが見つからない
    #[error("{0} が見つかりません")]
    NotFound(&'static str),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::AlreadyExists { .. } => Self::AlreadyRegistered,
            DomainError::NotFound { entity_type, .. } => Self::NotFound(entity_type),
        }
    }
}

impl ApiError {
    /// RFC 9457 レスポンスボディに変換する
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Validation(msg) => ErrorResponse::validation_error(msg.clone()),
            Self::AlreadyRegistered => {
                ErrorResponse::conflict("このメールアドレスは既に登録されています")
            }
            Self::AuthenticationFailed => {
                ErrorResponse::unauthorized("メールアドレスまたはパスワードが正しくありません")
            }
            Self::TokenInvalid => ErrorResponse::unauthorized("トークンが無効です"),
            Self::TokenExpired => ErrorResponse::new(
                "token-expired",
                "Token Expired",
                401,
                "トークンの有効期限が切れています",
            ),
            Self::Forbidden { required } => {
                ErrorResponse::forbidden(format!("必要な最低ロール: {required}"))
            }
            Self::NotFound(entity) => {
                ErrorResponse::not_found(format!("{entity} が見つかりません"))
            }
            Self::Database(e) => {
                tracing::error!(error = %e, span_trace = %e.span_trace(), "データベースエラー");
                ErrorResponse::internal_error()
            }
            Self::Internal(msg) => {
                tracing::error!("内部エラー: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }

    /// `WWW-Authenticate: Bearer` を付与すべきエラーかどうか
    fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::TokenInvalid | Self::TokenExpired
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.to_error_response();
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(body)).into_response();
        if self.is_unauthorized() {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
