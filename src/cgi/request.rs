//! CGIリクエストの構築

use std::collections::HashMap;
use std::env;

use log::debug;

use crate::common::{Method, Request};
use crate::error::Error;
use super::validation::{is_acceptable_cookie_value, is_acceptable_input_value, is_valid_header_name};

/// 環境変数名をヘッダー名に変換する（HTTP_X_AUTH_TOKEN -> x-auth-token）
fn env_key_to_header_name(key: &str) -> Option<String> {
    let raw = if let Some(rest) = key.strip_prefix("HTTP_") {
        rest
    } else if key == "CONTENT_TYPE" || key == "CONTENT_LENGTH" {
        key
    } else {
        return None;
    };
    Some(raw.replace('_', "-").to_ascii_lowercase())
}

/// 環境変数からHTTPヘッダーを取得する（名前は小文字）
pub fn get_cgi_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for (key, value) in env::vars() {
        let Some(header_name) = env_key_to_header_name(&key) else {
            continue;
        };
        // ヘッダー名のバリデーション（英数字とハイフンのみ許可、ASCII限定）
        if !is_valid_header_name(&header_name) {
            continue;
        }
        // 制御文字を含む値は捨てる
        let acceptable = if header_name == "cookie" {
            is_acceptable_cookie_value(&value)
        } else {
            is_acceptable_input_value(&value)
        };
        if !acceptable {
            debug!("Dropping header {} with control characters", header_name);
            continue;
        }
        headers.insert(header_name, value);
    }
    headers
}

/// CGI環境変数からリクエストを構築する
pub fn request_from_env() -> Result<Request, Error> {
    let method_str = env::var("REQUEST_METHOD").map_err(|_| {
        Error::InvalidRequest("REQUEST_METHOD environment variable not set".to_string())
    })?;

    let method = Method::from_str(&method_str).ok_or_else(|| {
        Error::InvalidRequest(format!("Invalid HTTP method: {}", method_str))
    })?;

    let path = env::var("PATH_INFO")
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string());
    let query_string = env::var("QUERY_STRING").unwrap_or_default();

    let mut request = Request::new(method, path).with_query_string(query_string);
    request.headers = get_cgi_headers();
    Ok(request)
}
