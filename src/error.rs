//! エラー型の定義

use thiserror::Error;

/// アプリケーションのエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// コールバック名に許可されていない文字が含まれている
    #[error("Unsafe character {character:?} in JSONP callback {callback:?}")]
    UnsafeCallbackCharacter { callback: String, character: char },

    /// コールバック名がどのプレフィックスにもマッチしない
    #[error("JSONP callback {0:?} does not match any allowed prefix")]
    DisallowedCallbackPrefix(String),

    /// レスポンスの書き込みに失敗
    #[error("Failed to write response: {0}")]
    WriteFailure(String),

    /// どのハンドラーも処理しなかった
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// 不正なリクエスト
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// 内部サーバーエラー
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl Error {
    /// エラーからHTTPステータスコードを取得
    pub fn status_code(&self) -> u16 {
        match self {
            Error::UnsafeCallbackCharacter { .. } => 400,
            Error::DisallowedCallbackPrefix(_) => 400,
            Error::WriteFailure(_) => 500,
            Error::RouteNotFound(_) => 404,
            Error::InvalidRequest(_) => 400,
            Error::ConfigurationError(_) => 500,
            Error::InternalServerError(_) => 500,
        }
    }

    /// コールバック検証による拒否かどうか
    pub fn is_callback_rejection(&self) -> bool {
        matches!(
            self,
            Error::UnsafeCallbackCharacter { .. } | Error::DisallowedCallbackPrefix(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let unsafe_cb = Error::UnsafeCallbackCharacter {
            callback: "a(b".to_string(),
            character: '(',
        };
        assert_eq!(unsafe_cb.status_code(), 400);
        assert!(unsafe_cb.is_callback_rejection());
        assert_eq!(Error::DisallowedCallbackPrefix("x".into()).status_code(), 400);
        assert_eq!(Error::WriteFailure("closed".into()).status_code(), 500);
        assert_eq!(Error::RouteNotFound("GET /".into()).status_code(), 404);
        assert!(!Error::WriteFailure("closed".into()).is_callback_rejection());
    }

    #[test]
    fn test_display() {
        let err = Error::UnsafeCallbackCharacter {
            callback: "evil)".to_string(),
            character: ')',
        };
        assert_eq!(err.to_string(), "Unsafe character ')' in JSONP callback \"evil)\"");
    }
}
