//! # トークンクリーンアップタスク
//!
//! 期限切れトークンと古い失効済みトークンを定期的に削除する
//! バックグラウンドタスク。
//!
//! ## 削除対象
//!
//! | 対象 | 条件 |
//! |------|------|
//! | 期限切れ | `expires_at` が現在時刻より前 |
//! | 古い失効済み | `is_active = false` かつ失効から [`INACTIVE_RETENTION_DAYS`] 日経過 |
//!
//! エラーはログに記録するのみで、タスク自体は次の周期で再試行する。

use std::{sync::Arc, time::Duration};

use chrono::Duration as ChronoDuration;
use kiban_domain::clock::Clock;
use kiban_infra::{InfraError, repository::AccessTokenRepository};

/// 失効済みトークンの保持日数
///
/// 監査のため、ログアウト済みレコードもこの日数だけ残す。
const INACTIVE_RETENTION_DAYS: i64 = 30;

/// トークンクリーンアップタスク
pub struct TokenCleanupTask {
    token_repository: Arc<dyn AccessTokenRepository>,
    clock:            Arc<dyn Clock>,
    interval:         Duration,
}

impl TokenCleanupTask {
    /// 新しいタスクインスタンスを作成
    pub fn new(
        token_repository: Arc<dyn AccessTokenRepository>,
        clock: Arc<dyn Clock>,
        interval_seconds: u64,
    ) -> Self {
        Self {
            token_repository,
            clock,
            interval: Duration::from_secs(interval_seconds),
        }
    }

    /// クリーンアップを1回実行する
    ///
    /// # 戻り値
    ///
    /// `(期限切れ削除数, 失効済み削除数)`
    pub async fn run_once(&self) -> Result<(u64, u64), InfraError> {
        let now = self.clock.now();

        let expired = self.token_repository.delete_expired(now).await?;
        if expired > 0 {
            tracing::info!(deleted = expired, "期限切れトークンを削除しました");
        }

        let cutoff = now - ChronoDuration::days(INACTIVE_RETENTION_DAYS);
        let inactive = self
            .token_repository
            .delete_inactive_before(cutoff)
            .await?;
        if inactive > 0 {
            tracing::info!(deleted = inactive, "古い失効済みトークンを削除しました");
        }

        Ok((expired, inactive))
    }

    /// バックグラウンドタスクとして起動する
    ///
    /// 設定された間隔で [`run_once`](Self::run_once) を繰り返す。
    /// 失敗してもタスクは停止せず、次の周期で再試行する。
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            // 起動直後の1回目はスキップ（マイグレーション直後の負荷を避ける）
            interval.tick().await;

            loop {
                interval.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::error!(error = %e, "トークンクリーンアップに失敗しました");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use kiban_domain::{
        clock::FixedClock,
        token::{AccessToken, AccessTokenId},
        user::UserId,
    };
    use kiban_infra::mock::MockAccessTokenRepository;

    use super::*;

    fn test_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn create_sut(repo: MockAccessTokenRepository, now: DateTime<Utc>) -> TokenCleanupTask {
        TokenCleanupTask::new(Arc::new(repo), Arc::new(FixedClock::new(now)), 3600)
    }

    fn active_token(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> AccessToken {
        AccessToken::new(AccessTokenId::new(), UserId::new(), expires_at, None, now)
    }

    fn inactive_token(updated_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> AccessToken {
        AccessToken::from_db(
            AccessTokenId::new(),
            UserId::new(),
            expires_at,
            false,
            None,
            updated_at,
            updated_at,
        )
    }

    #[tokio::test]
    async fn test_期限切れトークンが削除される() {
        // Given
        let now = test_now();
        let repo = MockAccessTokenRepository::new();
        repo.add_token(active_token(
            now - ChronoDuration::hours(2),
            now - ChronoDuration::hours(1),
        ));
        repo.add_token(active_token(now, now + ChronoDuration::minutes(30)));
        let sut = create_sut(repo.clone(), now);

        // When
        let (expired, inactive) = sut.run_once().await.unwrap();

        // Then
        assert_eq!(expired, 1);
        assert_eq!(inactive, 0);
        assert_eq!(repo.token_count(), 1);
    }

    #[tokio::test]
    async fn test_古い失効済みトークンが削除される() {
        // Given: 31日前に失効（期限はまだ先 = 期限切れ削除には該当しない）
        let now = test_now();
        let repo = MockAccessTokenRepository::new();
        repo.add_token(inactive_token(
            now - ChronoDuration::days(31),
            now + ChronoDuration::days(1),
        ));
        let sut = create_sut(repo.clone(), now);

        // When
        let (expired, inactive) = sut.run_once().await.unwrap();

        // Then
        assert_eq!(expired, 0);
        assert_eq!(inactive, 1);
        assert_eq!(repo.token_count(), 0);
    }

    #[tokio::test]
    async fn test_最近失効したトークンは保持される() {
        // Given: 1日前に失効
        let now = test_now();
        let repo = MockAccessTokenRepository::new();
        repo.add_token(inactive_token(
            now - ChronoDuration::days(1),
            now + ChronoDuration::days(1),
        ));
        let sut = create_sut(repo.clone(), now);

        // When
        let (expired, inactive) = sut.run_once().await.unwrap();

        // Then
        assert_eq!(expired, 0);
        assert_eq!(inactive, 0);
        assert_eq!(repo.token_count(), 1);
    }
}
