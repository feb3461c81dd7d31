//! エラーログとセキュリティ関連の機能

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use chrono::Local;

/// エラーログファイルのパスを取得する
/// 優先順位: 環境変数 `COOKIE2JSON_ERROR_LOG` -> デフォルト `cookie2json_error.log`
pub fn error_log_path() -> String {
    env::var("COOKIE2JSON_ERROR_LOG")
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "cookie2json_error.log".to_string())
}

/// エラー内容をログファイルに追記する
pub fn log_error_to_file(message: &str) {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC");
    let local_time = Local::now().format("%Y-%m-%d %H:%M:%S%.3f %Z");

    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(error_log_path())
    {
        let _ = writeln!(file, "================================================================================");
        let _ = writeln!(file, "COOKIE2JSON CGI ERROR");
        let _ = writeln!(file, "Timestamp (UTC): {}", timestamp);
        let _ = writeln!(file, "Timestamp (Local): {}", local_time);
        let _ = writeln!(file, "Process ID: {}", std::process::id());
        let _ = writeln!(file, "--------------------------------------------------------------------------------");
        let _ = writeln!(file, "{}", message);
        let _ = writeln!(file, "================================================================================");
        let _ = writeln!(file);
    }
}

/// panic時に記録するCGI環境の詳細（安全にマスク）を構築
pub fn gather_cgi_panic_context(method: &str, path: &str) -> String {
    let mut lines = vec![
        "CGI panic context:".to_string(),
        format!("  REQUEST_METHOD={}", method),
        format!("  PATH_INFO={}", path),
    ];

    let vars = [
        "QUERY_STRING",
        "SERVER_PROTOCOL",
        "SERVER_NAME",
        "REMOTE_ADDR",
        "HTTP_HOST",
        "HTTP_USER_AGENT",
        "HTTP_COOKIE",
    ];
    for key in vars.iter() {
        if let Ok(val) = env::var(key) {
            lines.push(format!("  {}={}", key, redact_value_for_log(key, &val)));
        }
    }

    lines.join("\n")
}

/// ログ用に値をマスク・切り詰める
pub fn redact_value_for_log(key: &str, value: &str) -> String {
    let key_l = key.to_ascii_lowercase();
    if key_l == "query_string" {
        return redact_query_string(value);
    }
    if is_sensitive_key_like(&key_l) {
        return "***redacted***".to_string();
    }
    truncate_for_log(value)
}

/// 長すぎる値は truncate（文字境界を保つ）
fn truncate_for_log(value: &str) -> String {
    const LIMIT: usize = 200;
    match value.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...[truncated]", &value[..idx]),
        None => value.to_string(),
    }
}

pub fn is_sensitive_key_like(lower_key: &str) -> bool {
    let patterns = [
        "authorization",
        "cookie",
        "token",
        "secret",
        "password",
        "api_key",
        "api-key",
        "session",
        "csrf",
        "credential",
    ];
    patterns.iter().any(|p| lower_key.contains(p))
}

pub fn redact_query_string(qs: &str) -> String {
    qs.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            if is_sensitive_key_like(&k.to_ascii_lowercase()) {
                format!("{}=***redacted***", k)
            } else {
                format!("{}={}", k, truncate_for_log(v))
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
