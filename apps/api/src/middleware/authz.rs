//! # 認可ミドルウェア
//!
//! Bearer トークンを検証し、RBAC ベースのアクセス制御を実現する。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let authz_state = AuthzState {
//!     token_usecase: token_usecase.clone(),
//!     minimum_role:  Role::Member,
//! };
//!
//! Router::new()
//!     .route("/api/v1/info", get(info))
//!     .layer(from_fn_with_state(authz_state, require_min_role))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use kiban_domain::{
    role::Role,
    token::AccessTokenId,
    user::UserId,
};

use crate::{error::ApiError, usecase::TokenUseCase};

/// 認可ミドルウェアの状態
#[derive(Clone)]
pub struct AuthzState {
    pub token_usecase: Arc<dyn TokenUseCase>,
    pub minimum_role:  Role,
}

/// 認証済みリクエストのコンテキスト
///
/// ミドルウェアが検証済みトークンから組み立て、リクエスト extensions に
/// 挿入する。ハンドラは `Extension<CurrentUser>` で取得できる。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token_id: AccessTokenId,
    pub user_id:  UserId,
    pub role:     Role,
}

/// `Authorization` ヘッダーから Bearer トークンを取り出す
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// 認可ミドルウェア
///
/// Bearer トークンを検証し、要求された最低ロールを満たすか確認する。
/// 検証を通過した場合は [`CurrentUser`] をリクエスト extensions に挿入する。
///
/// - トークンなし・無効: 401 Unauthorized
/// - ロール不足: 403 Forbidden
pub async fn require_min_role(
    State(state): State<AuthzState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(request.headers()) else {
        return ApiError::TokenInvalid.into_response();
    };

    let verified = match state.token_usecase.verify(token).await {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };

    if !verified.role.satisfies(state.minimum_role) {
        return ApiError::Forbidden {
            required: state.minimum_role,
        }
        .into_response();
    }

    request.extensions_mut().insert(CurrentUser {
        token_id: verified.token_id,
        user_id:  verified.user_id,
        role:     verified.role,
    });

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        Extension,
        Router,
        body::Body,
        http::{Method, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use kiban_domain::user::User;
    use tower::ServiceExt;

    use super::*;
    use crate::usecase::VerifiedToken;

    // テスト用スタブ
    struct StubTokenUseCase {
        role:  Role,
        valid: bool,
    }

    #[async_trait]
    impl TokenUseCase for StubTokenUseCase {
        async fn issue(
            &self,
            _user: &User,
            _ip_address: Option<String>,
        ) -> Result<String, ApiError> {
            unimplemented!("テストでは使用しない")
        }

        async fn verify(&self, _token: &str) -> Result<VerifiedToken, ApiError> {
            if self.valid {
                Ok(VerifiedToken {
                    token_id: AccessTokenId::new(),
                    user_id:  UserId::new(),
                    role:     self.role,
                })
            } else {
                Err(ApiError::TokenInvalid)
            }
        }

        async fn revoke(&self, _token: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    async fn protected(Extension(current): Extension<CurrentUser>) -> String {
        current.role.to_string()
    }

    fn create_test_app(stub: StubTokenUseCase, minimum_role: Role) -> Router {
        let state = AuthzState {
            token_usecase: Arc::new(stub),
            minimum_role,
        };

        Router::new()
            .route("/protected", get(protected))
            .layer(from_fn_with_state(state, require_min_role))
    }

    fn build_request(auth_header: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder()
            .method(Method::GET)
            .uri("/protected");
        if let Some(value) = auth_header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_ロールを満たす場合は通過しextensionが入る() {
        // Given
        let sut = create_test_app(
            StubTokenUseCase {
                role:  Role::Admin,
                valid: true,
            },
            Role::Member,
        );

        // When
        let response = sut
            .oneshot(build_request(Some("Bearer dummy-token")))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"ADMIN");
    }

    #[tokio::test]
    async fn test_ロール不足は403() {
        let sut = create_test_app(
            StubTokenUseCase {
                role:  Role::Viewer,
                valid: true,
            },
            Role::Member,
        );

        let response = sut
            .oneshot(build_request(Some("Bearer dummy-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_authorizationヘッダーなしは401() {
        let sut = create_test_app(
            StubTokenUseCase {
                role:  Role::Admin,
                valid: true,
            },
            Role::Member,
        );

        let response = sut.oneshot(build_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bearer形式でないヘッダーは401() {
        let sut = create_test_app(
            StubTokenUseCase {
                role:  Role::Admin,
                valid: true,
            },
            Role::Member,
        );

        let response = sut
            .oneshot(build_request(Some("Basic dXNlcjpwYXNz")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_無効なトークンは401() {
        let sut = create_test_app(
            StubTokenUseCase {
                role:  Role::Admin,
                valid: false,
            },
            Role::Member,
        );

        let response = sut
            .oneshot(build_request(Some("Bearer bad-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
