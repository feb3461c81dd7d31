//! CGIメイン実行ロジック

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::task;

use crate::common::{Request, Response, ResponseWriter, StatusCode};
use crate::error::Error;
use crate::{deliver, Cookie2Json};
use super::request::request_from_env;
use super::response::CgiWriter;
use super::error_logging::{log_error_to_file, gather_cgi_panic_context, redact_query_string};

/// CGIリクエスト情報を変換し、標準出力にレスポンスを書き出す
///
/// 戻り値は最終的なステータスコード（書き込み失敗時は 500）。
pub async fn run_cgi(app: Cookie2Json) -> Result<u16, Error> {
    let mut writer = CgiWriter::stdout();
    run_cgi_with_writer(app, &mut writer).await
}

/// 書き込み先を指定してCGIリクエストを処理する
pub async fn run_cgi_with_writer<W: ResponseWriter + ?Sized>(
    app: Cookie2Json,
    writer: &mut W,
) -> Result<u16, Error> {
    let app = Arc::new(app);

    let request = match request_from_env() {
        Ok(req) => req,
        Err(e) => {
            error!("Invalid CGI environment: {}", e);
            let status = deliver(&Response::from_error(&e), writer);
            return Ok(status);
        }
    };

    let method = request.method;
    let path = request.path.clone();
    debug!("Processing CGI request: {} {}", method, path);

    // ハンドラ内でのpanicを検知するためにspawnしてJoinErrorを検査
    let task_result = task::spawn(async move {
        process_request(&app, &request).await
    }).await;

    let response = match task_result {
        Ok(response) => response,
        Err(join_err) => {
            let panic_info = if join_err.is_panic() {
                "panic occurred in handler".to_string()
            } else {
                format!("task cancelled: {}", join_err)
            };
            error!("{}", panic_info);
            log_error_to_file(&format!("{} at {} {}", panic_info, method, path));
            // panic時は環境情報を追記（センシティブ値はマスク）
            if join_err.is_panic() {
                log_error_to_file(&gather_cgi_panic_context(&method.to_string(), &path));
            }
            Response::internal_server_error()
                .with_header("Content-Type", "text/plain")
                .with_body(b"Internal Server Error".to_vec())
        }
    };

    // 書き込み失敗はボディ組み立て後にしか起きないので 500 として報告する
    let status = match writer.write_response(&response) {
        Ok(()) => response.status,
        Err(e) => {
            error!("{}", e);
            log_error_to_file(&format!("Failed to write response for {} {}: {}", method, path, e));
            StatusCode::InternalServerError.as_u16()
        }
    };

    info!("CGI request processed with status {}", status);
    Ok(status)
}

/// リクエストを処理する
async fn process_request(app: &Cookie2Json, request: &Request) -> Response {
    match app.try_dispatch(request).await {
        Ok(response) => response,
        Err(e) if e.is_callback_rejection() => {
            warn!("Rejected JSONP callback: {}", e);
            log_error_to_file(&format!(
                "Rejected JSONP callback at {} {} (query: {}): {}",
                request.method,
                request.path,
                redact_query_string(request.query_string.as_deref().unwrap_or("")),
                e
            ));
            Response::from_error(&e)
        }
        Err(e) => {
            debug!("Request {} {} ended with: {}", request.method, request.path, e);
            Response::from_error(&e)
        }
    }
}
