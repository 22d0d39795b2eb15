//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum shared by every component of the core.
//! The UI collaborator branches on the kind to choose between a retry
//! affordance and a terminal message.

use serde::Serialize;

/// エラー種別の列挙体
///
/// コア全体で共通のエラー分類を定義します。
/// 各バリアントはリトライ可否と、HTTP ファサード用のステータスコードを持ちます。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Network;
/// assert!(kind.is_retryable());
/// assert_eq!(kind.as_str(), "Network Error");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 通信失敗（タイムアウト、DNS、接続リセット）: バックオフ付きでリトライ可能
    Network,
    /// 応答の形式が不正: データ障害、リトライ不可
    Decode,
    /// 認証失敗: ユーザーが資格情報を再入力する必要がある
    Auth,
    /// セッションなしで呼び出された: 呼び出し側の前提条件違反
    NotAuthenticated,
    /// 競合する操作が進行中: 即時リトライは不可
    ConcurrentOperation,
    /// お気に入りの同期がリトライ後も失敗: ローカル状態はロールバック済み
    Sync,
    /// 不正な参照（画像 ID、空の識別子など）
    InvalidReference,
    /// 対象が存在しない: 空の結果として扱う
    NotFound,
    /// 内部エラー
    Internal,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    ///
    /// ## Returns
    /// HTTP ファサードが返すステータスコード
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::NotAuthenticated.status_code(), 401);
    /// assert_eq!(ErrorKind::NotFound.status_code(), 404);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidReference => 400,
            ErrorKind::Auth | ErrorKind::NotAuthenticated => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::ConcurrentOperation => 409,
            ErrorKind::Internal => 500,
            ErrorKind::Decode => 502,
            ErrorKind::Network | ErrorKind::Sync => 503,
        }
    }

    /// ユーザー向けの文字列表現を取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::Sync.as_str(), "Sync Error");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "Network Error",
            ErrorKind::Decode => "Decode Error",
            ErrorKind::Auth => "Authentication Error",
            ErrorKind::NotAuthenticated => "Not Authenticated",
            ErrorKind::ConcurrentOperation => "Concurrent Operation",
            ErrorKind::Sync => "Sync Error",
            ErrorKind::InvalidReference => "Invalid Reference",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Internal => "Internal Error",
        }
    }

    /// 一時的な障害でリトライ可能かどうか
    ///
    /// `Network` のみが自動リトライの対象です。
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Network)
    }

    /// 失敗として伝播させず、空の結果として扱う種別かどうか
    #[inline]
    pub const fn is_benign(&self) -> bool {
        matches!(self, ErrorKind::NotFound | ErrorKind::InvalidReference)
    }

    /// ユーザーが手動で再試行できる種別かどうか
    ///
    /// UI はこれを使って「再試行」ボタンを表示するか決めます。
    #[inline]
    pub const fn offers_retry(&self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::Sync | ErrorKind::ConcurrentOperation
        )
    }

    /// 内部側の障害かどうか（ログに記録すべき）
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::InvalidReference.status_code(), 400);
        assert_eq!(ErrorKind::Auth.status_code(), 401);
        assert_eq!(ErrorKind::NotAuthenticated.status_code(), 401);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::ConcurrentOperation.status_code(), 409);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
        assert_eq!(ErrorKind::Decode.status_code(), 502);
        assert_eq!(ErrorKind::Network.status_code(), 503);
        assert_eq!(ErrorKind::Sync.status_code(), 503);
    }

    #[test]
    fn test_only_network_is_retryable() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(!ErrorKind::Decode.is_retryable());
        assert!(!ErrorKind::Auth.is_retryable());
        assert!(!ErrorKind::Sync.is_retryable());
        assert!(!ErrorKind::ConcurrentOperation.is_retryable());
    }

    #[test]
    fn test_benign_kinds() {
        assert!(ErrorKind::NotFound.is_benign());
        assert!(ErrorKind::InvalidReference.is_benign());
        assert!(!ErrorKind::Network.is_benign());
    }

    #[test]
    fn test_retry_affordance() {
        assert!(ErrorKind::Sync.offers_retry());
        assert!(ErrorKind::Network.offers_retry());
        assert!(!ErrorKind::Decode.offers_retry());
        assert!(!ErrorKind::NotAuthenticated.offers_retry());
    }

    #[test]
    fn test_serialized_name() {
        let json = serde_json::to_string(&ErrorKind::NotAuthenticated).unwrap();
        assert_eq!(json, "\"NOT_AUTHENTICATED\"");
    }
}
