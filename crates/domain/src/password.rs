//! # パスワード
//!
//! パスワード関連の値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`PlainPassword`] | 平文パスワード | 登録・ログイン時の入力値 |
//! | [`PasswordHash`] | パスワードハッシュ | 永続化用のハッシュ値 |
//! | [`PasswordVerifyResult`] | 検証結果 | パスワード検証の成否 |

use crate::DomainError;

/// パスワードに要求する特殊文字の集合
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// パスワードの最低文字数
const MIN_LENGTH: usize = 4;

/// 平文パスワード（登録・ログイン時の入力値）
///
/// ユーザーが入力したパスワードをラップする。
///
/// # セキュリティ
///
/// Debug 出力ではパスワードの値をマスクする。
#[derive(Clone)]
pub struct PlainPassword(String);

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PlainPassword").field(&"[REDACTED]").finish()
    }
}

impl PlainPassword {
    /// パスワードを作成する
    ///
    /// ログイン時の入力は既存ユーザーのパスワードである可能性があるため、
    /// この時点ではポリシー検証を行わない。新規登録時は
    /// [`validate_strength`](Self::validate_strength) を呼び出すこと。
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// パスワードポリシーを検証する
    ///
    /// # ポリシー
    ///
    /// - [`MIN_LENGTH`] 文字以上
    /// - 英字を1文字以上含む
    /// - 数字を1文字以上含む
    /// - 特殊文字（[`SPECIAL_CHARS`]）を1文字以上含む
    ///
    /// # エラー
    ///
    /// 違反した場合は `DomainError::Validation` を返す。
    pub fn validate_strength(&self) -> Result<(), DomainError> {
        if self.0.chars().count() < MIN_LENGTH {
            return Err(DomainError::Validation(format!(
                "パスワードは{MIN_LENGTH}文字以上である必要があります"
            )));
        }

        if !self.0.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::Validation(
                "パスワードは英字を1文字以上含む必要があります".to_string(),
            ));
        }

        if !self.0.chars().any(|c| c.is_ascii_digit()) {
            return Err(DomainError::Validation(
                "パスワードは数字を1文字以上含む必要があります".to_string(),
            ));
        }

        if !self.0.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err(DomainError::Validation(format!(
                "パスワードは特殊文字（{SPECIAL_CHARS}）を1文字以上含む必要があります"
            )));
        }

        Ok(())
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// パスワードハッシュ（永続化用）
///
/// Argon2id でハッシュ化されたパスワード文字列（PHC 形式）をラップする。
/// データベースに保存される形式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// ハッシュ文字列からインスタンスを作成する
    ///
    /// 主にデータベースからの復元時に使用する。
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

/// パスワード検証結果
///
/// パスワード検証の成否を表す列挙型。
/// bool ではなく専用の型を使うことで、意図が明確になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerifyResult {
    /// パスワードが一致した
    Match,
    /// パスワードが一致しなかった
    Mismatch,
}

impl PasswordVerifyResult {
    /// 一致したかどうかを返す
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// 一致しなかったかどうかを返す
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch)
    }
}

impl From<bool> for PasswordVerifyResult {
    fn from(matched: bool) -> Self {
        if matched { Self::Match } else { Self::Mismatch }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_平文パスワードを作成できる() {
        let password = PlainPassword::new("pass1!");
        assert_eq!(password.as_str(), "pass1!");
    }

    #[rstest]
    fn test_平文パスワードのdebug出力はマスクされる() {
        let password = PlainPassword::new("secret1!");
        let debug = format!("{:?}", password);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret1!"));
    }

    #[rstest]
    #[case("a1!x")]
    #[case("password1!")]
    #[case("Pa5.word")]
    fn test_ポリシーを満たすパスワード(#[case] value: &str) {
        let password = PlainPassword::new(value);
        assert!(password.validate_strength().is_ok());
    }

    #[rstest]
    #[case::短すぎる("a1!")]
    #[case::英字なし("1234!")]
    #[case::数字なし("abcd!")]
    #[case::特殊文字なし("abc123")]
    fn test_ポリシー違反のパスワードはエラー(#[case] value: &str) {
        let password = PlainPassword::new(value);
        assert!(password.validate_strength().is_err());
    }

    #[rstest]
    fn test_パスワードハッシュを作成できる() {
        let hash = PasswordHash::new("$argon2id$v=19$...");
        assert_eq!(hash.as_str(), "$argon2id$v=19$...");
    }

    #[rstest]
    fn test_検証結果の判定メソッド() {
        assert!(PasswordVerifyResult::Match.is_match());
        assert!(!PasswordVerifyResult::Match.is_mismatch());
        assert!(PasswordVerifyResult::Mismatch.is_mismatch());
    }

    #[rstest]
    fn test_boolからの変換() {
        assert_eq!(
            PasswordVerifyResult::from(true),
            PasswordVerifyResult::Match
        );
        assert_eq!(
            PasswordVerifyResult::from(false),
            PasswordVerifyResult::Mismatch
        );
    }
}
