//! # 認証ハンドラ
//!
//! 認証エンドポイントを提供する。
//!
//! ## エンドポイント
//!
//! - `POST /api/v1/auth/register` - ユーザー登録
//! - `POST /api/v1/auth/token` - ログイン（アクセストークン発行）
//! - `POST /api/v1/auth/logout` - ログアウト（トークン失効）
//! - `GET /api/v1/auth/me` - 認証済みユーザー取得

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use kiban_domain::{role::Role, user::User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, middleware::authz::extract_bearer_token, usecase::AuthUseCase};

/// 認証ハンドラの共有状態
pub struct AuthState {
    pub usecase: Arc<dyn AuthUseCase>,
}

// --- リクエスト/レスポンス型 ---

/// ユーザー登録リクエスト
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email:    String,
    pub password: String,
    /// 省略時は VIEWER
    #[serde(default)]
    pub role:     Option<Role>,
}

/// ユーザーレスポンス
///
/// パスワードハッシュは含めない。
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id:         Uuid,
    pub email:      String,
    pub role:       Role,
    pub is_active:  bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id:         *user.id().as_uuid(),
            email:      user.email().as_str().to_string(),
            role:       user.role(),
            is_active:  user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email:    String,
    pub password: String,
}

/// トークンレスポンス
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type:   String,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// メッセージレスポンス
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `X-Forwarded-For` ヘッダーからクライアント IP を取り出す
///
/// 複数ホップを経由した場合は先頭（オリジナルクライアント）を採用する。
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
}

// --- ハンドラ ---

/// POST /api/v1/auth/register
///
/// ユーザーを登録する。
pub async fn register(
    State(state): State<Arc<AuthState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .usecase
        .register(&req.email, &req.password, req.role)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/v1/auth/token
///
/// ログインしてアクセストークンを発行する。
pub async fn login(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let access_token = state
        .usecase
        .login(&req.email, &req.password, client_ip(&headers))
        .await?;

    Ok(Json(TokenResponse::bearer(access_token)))
}

/// POST /api/v1/auth/logout
///
/// Bearer トークンを失効させる。
pub async fn logout(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers).ok_or(ApiError::TokenInvalid)?;
    state.usecase.logout(token).await?;

    Ok(Json(MessageResponse {
        message: "ログアウトしました".to_string(),
    }))
}

/// GET /api/v1/auth/me
///
/// Bearer トークンを検証し、認証済みユーザーを返す。
pub async fn me(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers).ok_or(ApiError::TokenInvalid)?;
    let user = state.usecase.current_user(token).await?;

    Ok(Json(UserResponse::from(&user)))
}
