//! # トークンユースケース
//!
//! JWT の発行・検証・失効を実装する。
//!
//! ## トークンのライフサイクル
//!
//! 1. **発行**: ログイン成功時にトークンレコードを作成し、レコード ID を
//!    `sub` クレームに入れた JWT を HS256 で署名する
//! 2. **検証**: 署名と有効期限を検証した後、レコードが失効していないことを
//!    確認する（署名が正しくてもログアウト済みなら無効）
//! 3. **失効**: ログアウト時にレコードを `is_active = false` に更新する

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kiban_domain::{
    clock::Clock,
    role::Role,
    token::{AccessToken, AccessTokenId},
    user::{User, UserId},
};
use kiban_infra::repository::AccessTokenRepository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError};

/// JWT の発行者（`iss` クレーム）
const ISSUER: &str = "kiban";

/// JWT クレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// トークンレコード ID
    pub sub:  String,
    /// ユーザー ID
    pub uid:  String,
    /// ユーザーロール
    pub role: Role,
    /// 発行者
    pub iss:  String,
    /// 発行日時（Unix タイムスタンプ）
    pub iat:  i64,
    /// 有効期限（Unix タイムスタンプ）
    pub exp:  i64,
}

/// 検証済みトークンの情報
///
/// 署名・有効期限・レコード有効性の検証を通過したトークンから
/// 取り出した認証コンテキスト。
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub token_id: AccessTokenId,
    pub user_id:  UserId,
    pub role:     Role,
}

/// トークンユースケーストレイト
///
/// ハンドラ・ミドルウェアはこのトレイト経由でトークン操作を行う。
#[async_trait]
pub trait TokenUseCase: Send + Sync {
    /// ユーザーにアクセストークンを発行する
    ///
    /// トークンレコードを作成し、署名済み JWT 文字列を返す。
    async fn issue(&self, user: &User, ip_address: Option<String>) -> Result<String, ApiError>;

    /// JWT を検証する
    ///
    /// 署名・有効期限・発行者を検証し、対応するレコードが
    /// アクティブであることを確認する。
    async fn verify(&self, token: &str) -> Result<VerifiedToken, ApiError>;

    /// JWT を失効させる
    ///
    /// 対応するレコードを `is_active = false` に更新する。
    async fn revoke(&self, token: &str) -> Result<(), ApiError>;
}

/// トークンユースケースの実装
pub struct TokenUseCaseImpl {
    token_repository: Arc<dyn AccessTokenRepository>,
    clock:            Arc<dyn Clock>,
    encoding_key:     EncodingKey,
    decoding_key:     DecodingKey,
    expire_minutes:   i64,
}

impl TokenUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        token_repository: Arc<dyn AccessTokenRepository>,
        clock: Arc<dyn Clock>,
        jwt_config: &JwtConfig,
    ) -> Self {
        Self {
            token_repository,
            clock,
            encoding_key: EncodingKey::from_secret(jwt_config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_config.secret_key.as_bytes()),
            expire_minutes: jwt_config.access_token_expire_minutes,
        }
    }

    /// JWT 文字列をデコードしてクレームを取り出す
    ///
    /// 署名・有効期限・発行者を検証する。
    fn decode_claims(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::TokenInvalid,
            }
        })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl TokenUseCase for TokenUseCaseImpl {
    async fn issue(&self, user: &User, ip_address: Option<String>) -> Result<String, ApiError> {
        let now = self.clock.now();
        let expires_at = now + Duration::minutes(self.expire_minutes);

        let record = AccessToken::new(
            AccessTokenId::new(),
            *user.id(),
            expires_at,
            ip_address,
            now,
        );
        self.token_repository.create(&record).await?;

        let claims = Claims {
            sub:  record.id().to_string(),
            uid:  user.id().to_string(),
            role: user.role(),
            iss:  ISSUER.to_string(),
            iat:  now.timestamp(),
            exp:  expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("JWT の署名に失敗しました: {e}")))
    }

    async fn verify(&self, token: &str) -> Result<VerifiedToken, ApiError> {
        let claims = self.decode_claims(token)?;

        let token_id = claims
            .sub
            .parse::<Uuid>()
            .map(AccessTokenId::from_uuid)
            .map_err(|_| ApiError::TokenInvalid)?;
        let user_id = claims
            .uid
            .parse::<Uuid>()
            .map(UserId::from_uuid)
            .map_err(|_| ApiError::TokenInvalid)?;

        // 署名が正しくても、サーバー側レコードが失効していれば無効
        let record = self
            .token_repository
            .find_by_id(&token_id)
            .await?
            .ok_or(ApiError::TokenInvalid)?;

        if !record.is_usable(self.clock.now()) {
            return Err(ApiError::TokenInvalid);
        }

        Ok(VerifiedToken {
            token_id,
            user_id,
            role: claims.role,
        })
    }

    async fn revoke(&self, token: &str) -> Result<(), ApiError> {
        let claims = self.decode_claims(token)?;
        let token_id = claims
            .sub
            .parse::<Uuid>()
            .map(AccessTokenId::from_uuid)
            .map_err(|_| ApiError::TokenInvalid)?;

        self.token_repository.deactivate(&token_id).await?;
        Ok(())
    }
}
