//! # Kiban API サーバー
//!
//! JWT 認証・RBAC・PostgreSQL 永続化・Observability を備えた
//! バックエンド API のスターターキット。
//!
//! ## エンドポイント
//!
//! | パス | 認証 | 説明 |
//! |------|------|------|
//! | `POST /api/v1/auth/register` | 不要 | ユーザー登録 |
//! | `POST /api/v1/auth/token` | 不要 | ログイン（JWT 発行） |
//! | `POST /api/v1/auth/logout` | Bearer | トークン失効 |
//! | `GET /api/v1/auth/me` | Bearer | 認証済みユーザー取得 |
//! | `GET /api/v1/info` | Bearer（MEMBER 以上） | サービス情報 |
//! | `GET /v1/ping` | 不要 | 疎通確認 |
//! | `GET /health` | 不要 | Liveness |
//! | `GET /health/ready` | 不要 | Readiness（DB 接続確認） |
//! | `GET /metrics` | 不要 | Prometheus メトリクス |
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `API_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `API_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `JWT_SECRET_KEY` | **Yes** | HS256 署名鍵 |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | No | トークン有効期間（デフォルト: 30） |
//! | `TOKEN_CLEANUP_INTERVAL_SECONDS` | No | クリーンアップ間隔（デフォルト: 3600） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,kiban=debug`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p kiban-api
//!
//! # 本番環境
//! API_PORT=8000 DATABASE_URL=postgres://... JWT_SECRET_KEY=... \
//!     LOG_FORMAT=json cargo run -p kiban-api --release
//! ```

mod config;
mod error;
mod handler;
mod metrics;
mod middleware;
mod usecase;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use config::ApiConfig;
use handler::{
    AuthState,
    ReadinessState,
    health_check,
    info,
    login,
    logout,
    me,
    ping,
    readiness_check,
    register,
};
use kiban_domain::{
    clock::{Clock, SystemClock},
    role::Role,
};
use kiban_infra::{
    Argon2PasswordHasher,
    PasswordHasher,
    db,
    repository::{
        AccessTokenRepository,
        PostgresAccessTokenRepository,
        PostgresUserRepository,
        UserRepository,
    },
};
use kiban_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{TracingConfig, make_request_span},
};
use middleware::{AuthzState, require_min_role, track_metrics};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use usecase::{AuthUseCaseImpl, TokenCleanupTask, TokenUseCase, TokenUseCaseImpl};

/// API サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("api");
    kiban_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "api").entered();

    // メトリクスレコーダーはログ初期化直後にインストールする
    let metrics_handle = metrics::setup_metrics_recorder();

    // 設定読み込み
    let config = ApiConfig::from_env().expect("設定の読み込みに失敗しました");

    tracing::info!(
        "API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("データベース接続に失敗しました");
    tracing::info!("データベースに接続しました");

    // マイグレーション実行
    db::run_migrations(&pool)
        .await
        .expect("マイグレーションの実行に失敗しました");
    tracing::info!("マイグレーションを適用しました");

    // Readiness Check 用 State（pool が move される前に clone）
    let readiness_state = Arc::new(ReadinessState { pool: pool.clone() });

    // 依存コンポーネントを初期化
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let token_repository: Arc<dyn AccessTokenRepository> =
        Arc::new(PostgresAccessTokenRepository::new(pool));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let token_usecase: Arc<dyn TokenUseCase> = Arc::new(TokenUseCaseImpl::new(
        token_repository.clone(),
        clock.clone(),
        &config.jwt,
    ));
    let auth_usecase = AuthUseCaseImpl::new(
        user_repository,
        password_hasher,
        token_usecase.clone(),
        clock.clone(),
    );
    let auth_state = Arc::new(AuthState {
        usecase: Arc::new(auth_usecase),
    });

    // トークンクリーンアップタスクを起動
    let _cleanup_handle = TokenCleanupTask::new(
        token_repository,
        clock,
        config.token_cleanup_interval_seconds,
    )
    .spawn();
    tracing::info!(
        interval_seconds = config.token_cleanup_interval_seconds,
        "トークンクリーンアップタスクを起動しました"
    );

    // RBAC で保護されたルート（MEMBER 以上）
    let authz_state = AuthzState {
        token_usecase: token_usecase.clone(),
        minimum_role:  Role::Member,
    };
    let protected_routes = Router::new()
        .route("/api/v1/info", get(info))
        .layer(axum::middleware::from_fn_with_state(
            authz_state,
            require_min_role,
        ));

    // ルーター構築
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .route(
            "/metrics",
            get(move || std::future::ready(metrics_handle.render())),
        )
        .route("/v1/ping", get(ping))
        .merge(
            Router::new()
                .route("/api/v1/auth/register", post(register))
                .route("/api/v1/auth/token", post(login))
                .route("/api/v1/auth/logout", post(logout))
                .route("/api/v1/auth/me", get(me))
                .with_state(auth_state),
        )
        .merge(protected_routes)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(track_metrics))
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("アドレスのパースに失敗しました");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
