//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |
//! | `AlreadyExists` | 409 Conflict | 一意制約に反する登録 |
//!
//! ## 使用例
//!
//! ```rust
//! use kiban_domain::DomainError;
//!
//! fn validate_email(value: &str) -> Result<(), DomainError> {
//!     if value.is_empty() {
//!         return Err(DomainError::Validation(
//!             "メールアドレスは必須です".to_string(),
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - パスワードポリシー違反
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    ///
    /// 指定された ID のエンティティがデータベースに存在しない場合に使用する。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"User", "AccessToken" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 一意制約違反（登録済み）
    ///
    /// メールアドレスの重複登録など、既に存在するエンティティと
    /// 衝突する登録を試みた場合に使用する。
    #[error("{entity_type} は既に存在します: {key}")]
    AlreadyExists {
        /// エンティティの種類
        entity_type: &'static str,
        /// 衝突したキー（メールアドレスなど）
        key:         String,
    },
}
