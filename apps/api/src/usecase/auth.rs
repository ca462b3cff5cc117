//! # 認証ユースケース
//!
//! ユーザー登録・ログイン・ログアウト・認証済みユーザー取得の
//! ビジネスロジックを実装する。
//!
//! ## タイミング攻撃対策
//!
//! ログインのパスワード検証では、ユーザーが存在しない場合もダミーハッシュで
//! 検証を実行し、処理時間を均一化する。レスポンスもメールアドレス不明と
//! パスワード不一致を区別しない。

use std::sync::Arc;

use async_trait::async_trait;
use kiban_domain::{
    DomainError,
    clock::Clock,
    password::PlainPassword,
    role::Role,
    user::{Email, User, UserId},
};
use kiban_infra::{PasswordHasher, repository::UserRepository};

use crate::{error::ApiError, usecase::token::TokenUseCase};

/// 認証ユースケーストレイト
///
/// ハンドラはこのトレイト経由で認証操作を行う。
#[async_trait]
pub trait AuthUseCase: Send + Sync {
    /// ユーザーを登録する
    ///
    /// メールアドレスの形式・パスワードポリシーを検証し、
    /// 重複がなければハッシュ化して保存する。
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<User, ApiError>;

    /// ログインしてアクセストークンを発行する
    ///
    /// 認証失敗時はメールアドレス不明・パスワード不一致・アカウント無効を
    /// 区別せず [`ApiError::AuthenticationFailed`] を返す。
    async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
    ) -> Result<String, ApiError>;

    /// トークンから認証済みユーザーを取得する
    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    /// ログアウトする（トークンを失効させる）
    async fn logout(&self, token: &str) -> Result<(), ApiError>;
}

/// 認証ユースケースの実装
pub struct AuthUseCaseImpl {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_usecase:   Arc<dyn TokenUseCase>,
    clock:           Arc<dyn Clock>,
}

impl AuthUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_usecase: Arc<dyn TokenUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_usecase,
            clock,
        }
    }

    /// ダミーハッシュで検証を実行する（タイミング攻撃対策）
    ///
    /// ユーザーが存在しない場合も実際のパスワード検証と同等の時間を消費する。
    /// 固定 sleep ではなく実際に Argon2id 検証を実行することで、
    /// CPU/メモリ状況による自然な変動も含めて同じ時間特性になる。
    fn dummy_verification(&self, password: &PlainPassword) {
        // ダミーハッシュ（有効な Argon2id 形式）
        let dummy_hash = kiban_domain::password::PasswordHash::new(
            "$argon2id$v=19$m=65536,t=1,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        );
        // 結果は無視（エラーでも問題ない）
        let _ = self.password_hasher.verify(password, &dummy_hash);
    }
}

#[async_trait]
impl AuthUseCase for AuthUseCaseImpl {
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<User, ApiError> {
        let email = Email::new(email)?;
        let password = PlainPassword::new(password);
        password.validate_strength()?;

        // ハッシュ化の前に重複を確認する（重い処理を無駄にしない）
        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(DomainError::AlreadyExists {
                entity_type: "User",
                key:         email.into_string(),
            }
            .into());
        }

        let password_hash = self.password_hasher.hash(&password)?;
        let user = User::new(
            UserId::new(),
            email,
            password_hash,
            role.unwrap_or_default(),
            self.clock.now(),
        );
        self.user_repository.create(&user).await?;

        tracing::info!(user_id = %user.id(), "ユーザーを登録しました");
        Ok(user)
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
    ) -> Result<String, ApiError> {
        let password = PlainPassword::new(password);

        // メールアドレスの形式が不正な場合もダミー検証を行い、
        // レスポンス・処理時間ともに存在確認の手がかりを与えない
        let Ok(email) = Email::new(email) else {
            self.dummy_verification(&password);
            return Err(ApiError::AuthenticationFailed);
        };

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) if user.is_active() => user,
            Some(_) | None => {
                self.dummy_verification(&password);
                return Err(ApiError::AuthenticationFailed);
            }
        };

        let result = self
            .password_hasher
            .verify(&password, user.password_hash())?;
        if result.is_mismatch() {
            return Err(ApiError::AuthenticationFailed);
        }

        let jwt = self.token_usecase.issue(&user, ip_address).await?;

        tracing::info!(user_id = %user.id(), "ログインしました");
        Ok(jwt)
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let verified = self.token_usecase.verify(token).await?;

        // トークンが有効でも、ユーザーが削除・無効化されていれば認証失敗
        let user = self
            .user_repository
            .find_by_id(&verified.user_id)
            .await?
            .ok_or(ApiError::TokenInvalid)?;

        if !user.is_active() {
            return Err(ApiError::TokenInvalid);
        }

        Ok(user)
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.token_usecase.revoke(token).await?;
        tracing::info!("ログアウトしました");
        Ok(())
    }
}
