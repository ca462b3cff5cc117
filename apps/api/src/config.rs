//! # API サーバー設定
//!
//! 環境変数から API サーバーの設定を読み込む。

use std::env;

/// JWT 関連の設定
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 署名鍵
    pub secret_key:                  String,
    /// アクセストークンの有効期間（分）
    pub access_token_expire_minutes: i64,
}

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// バインドアドレス
    pub host:                           String,
    /// ポート番号
    pub port:                           u16,
    /// データベース接続 URL
    pub database_url:                   String,
    /// JWT 設定
    pub jwt:                            JwtConfig,
    /// トークンクリーンアップの実行間隔（秒）
    pub token_cleanup_interval_seconds: u64,
}

impl ApiConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host:                           env::var("API_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port:                           env::var("API_PORT")
                .expect("API_PORT が設定されていません（.env.example を参照してください）")
                .parse()
                .expect("API_PORT は有効なポート番号である必要があります"),
            database_url:                   env::var("DATABASE_URL")
                .expect("DATABASE_URL が設定されていません（.env.example を参照してください）"),
            jwt:                            JwtConfig {
                secret_key:                  env::var("JWT_SECRET_KEY")
                    .expect("JWT_SECRET_KEY が設定されていません（.env.example を参照してください）"),
                access_token_expire_minutes: env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("ACCESS_TOKEN_EXPIRE_MINUTES は整数である必要があります"),
            },
            token_cleanup_interval_seconds: env::var("TOKEN_CLEANUP_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .expect("TOKEN_CLEANUP_INTERVAL_SECONDS は整数である必要があります"),
        })
    }
}
