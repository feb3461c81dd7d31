//! 共通ユーティリティ関数群（環境設定）

use std::env;

/// 変換を適用するパスパターンの既定値（全パス）
pub const DEFAULT_PATH_PATTERN: &str = "^/.*$";

/// 変換を適用するパスパターン（正規表現）を取得する
/// 優先順位: 環境変数 `COOKIE2JSON_PATH` -> デフォルト `^/.*$`
pub fn get_path_pattern() -> String {
    env::var("COOKIE2JSON_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PATH_PATTERN.to_string())
}

/// HTTPサーバーの待ち受けポートを取得する
/// 優先順位: 環境変数 `PORT` -> デフォルト 8080
pub fn get_listen_port() -> Result<u16, std::num::ParseIntError> {
    env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_env::with_vars;

    #[test]
    fn test_get_path_pattern() {
        with_vars([("COOKIE2JSON_PATH", None::<&str>)], || {
            assert_eq!(get_path_pattern(), DEFAULT_PATH_PATTERN);
        });
        with_vars([("COOKIE2JSON_PATH", Some("^/api/cookies$"))], || {
            assert_eq!(get_path_pattern(), "^/api/cookies$");
        });
        with_vars([("COOKIE2JSON_PATH", Some("  "))], || {
            assert_eq!(get_path_pattern(), DEFAULT_PATH_PATTERN);
        });
    }

    #[test]
    fn test_get_listen_port() {
        with_vars([("PORT", None::<&str>)], || {
            assert_eq!(get_listen_port(), Ok(8080));
        });
        with_vars([("PORT", Some("9000"))], || {
            assert_eq!(get_listen_port(), Ok(9000));
        });
        with_vars([("PORT", Some("http"))], || {
            assert!(get_listen_port().is_err());
        });
    }
}
