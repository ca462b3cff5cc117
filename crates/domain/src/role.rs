//! # ロール（RBAC）
//!
//! ユーザーに割り当てる固定ロールと、その序列比較を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`Role`] | ロール（役割） | エンドポイントの必要ロールと比較される認可タグ |
//!
//! ## 設計方針
//!
//! - **固定列挙**: ロールは5種類の固定セット。テーブル管理や階層構造は持たない
//! - **数値序列**: `level()` の大小比較のみで認可を判定する
//! - **文字列表現**: DB・JWT クレームには SCREAMING_SNAKE_CASE で保存する

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// ユーザーロール
///
/// 認可判定に使用する固定ロール。`satisfies` で「最低ロール」要求と
/// 比較する以外のロジックは持たない。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// 組織オーナー（全操作可能）
    Owner,
    /// 管理者（ユーザー・課金の管理）
    Admin,
    /// 一般ユーザー
    Member,
    /// 読み取り専用ユーザー
    Viewer,
    /// プログラマティックアクセス用
    ApiKey,
}

impl Role {
    /// ロールの序列値を返す
    ///
    /// 値が大きいほど強い権限を持つ。序列値そのものは永続化せず、
    /// 比較のためだけに使用する。
    pub fn level(&self) -> u8 {
        match self {
            Self::Owner => 100,
            Self::Admin => 75,
            Self::Member => 50,
            Self::Viewer => 25,
            Self::ApiKey => 10,
        }
    }

    /// 最低ロール要求を満たすかを判定する
    ///
    /// `self` の序列値が `minimum` の序列値以上であれば `true`。
    pub fn satisfies(&self, minimum: Role) -> bool {
        self.level() >= minimum.level()
    }
}

impl Default for Role {
    /// 新規登録時のデフォルトロール
    fn default() -> Self {
        Self::Viewer
    }
}
