//! CGIレスポンスの出力機能

use std::io::{self, Write};
use log::error;

use crate::common::{Response, ResponseWriter, StatusCode};
use crate::error::Error;
use super::validation::{is_valid_header_name, is_valid_header_value};
use super::error_logging::log_error_to_file;

/// レスポンスを任意のライターへ書き出す
pub fn write_response_to<W: Write>(response: &Response, out: &mut W) -> Result<(), Error> {
    // 出力前に全ヘッダーを検証し、予約ヘッダーを除外する
    let mut sanitized_headers: Vec<(&str, &str)> = Vec::new();
    let mut replacement = None;

    for (name, value) in &response.headers {
        // 予約ヘッダーはユーザー指定を無視
        if name.eq_ignore_ascii_case("Status") || name.eq_ignore_ascii_case("Content-Length") {
            continue;
        }
        if !is_valid_header_name(name) || !is_valid_header_value(value) {
            error!("Invalid header detected - name: '{}', value: '{}'", name, value);
            log_error_to_file(&format!(
                "CRLF injection attempt detected in header: '{}': '{}'",
                name, value
            ));
            // 安全な500レスポンスに置き換える
            replacement = Some(
                Response::internal_server_error()
                    .with_header("Content-Type", "text/plain; charset=utf-8")
                    .with_body(b"Internal Server Error".to_vec()),
            );
            break;
        }
        sanitized_headers.push((name.as_str(), value.as_str()));
    }

    if let Some(safe) = replacement.as_ref() {
        return write_response_to(safe, out);
    }

    // ヘッダーの出力順を固定する
    sanitized_headers.sort_unstable();

    let reason_phrase = StatusCode::from_u16(response.status)
        .map(|s| s.reason_phrase())
        .unwrap_or("Unknown");

    let mut head = format!("Status: {} {}\r\n", response.status, reason_phrase);
    for (name, value) in sanitized_headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    // Content-Length をフレームワーク側で付与（ボディがある場合）
    if let Some(body) = &response.body {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    // ヘッダーとボディの区切り（CRLF）
    head.push_str("\r\n");

    // ヘッダーとボディをまとめて組み立ててから一度に書き出す
    let mut buffer = head.into_bytes();
    if let Some(body) = &response.body {
        buffer.extend_from_slice(body);
    }

    out.write_all(&buffer)
        .and_then(|_| out.flush())
        .map_err(|e| Error::WriteFailure(format!("Failed to write CGI response: {}", e)))
}

/// 任意のライターをResponseWriterとして扱うラッパー
pub struct CgiWriter<W: Write> {
    out: W,
}

impl<W: Write> CgiWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl CgiWriter<io::Stdout> {
    /// 標準出力に書き出すライター
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ResponseWriter for CgiWriter<W> {
    fn write_response(&mut self, response: &Response) -> Result<(), Error> {
        write_response_to(response, &mut self.out)
    }
}
