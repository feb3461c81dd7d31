//! Google Cloud Run（HTTPサーバー）向けの実装

use std::sync::Arc;
use log::{error, info, warn};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web::http::header::{HeaderMap, COOKIE};

use crate::common::{Method, Request, Response};
use crate::Cookie2Json;

/// actix-webのリクエストから共通形式のRequestに変換
///
/// 複数の Cookie ヘッダーは `, ` で連結する。
fn convert_request(req: &HttpRequest) -> Option<Request> {
    let method = Method::from_str(req.method().as_str())?;
    let mut request = Request::new(method, req.uri().path())
        .with_query_string(req.query_string());
    copy_headers(req.headers(), &mut request);
    Some(request)
}

/// actix-webのHeaderMapから共通形式のヘッダーに変換
fn copy_headers(headers: &HeaderMap, request: &mut Request) {
    for (key, value) in headers.iter() {
        match value.to_str() {
            Ok(value_str) => request.append_header(key.as_str(), value_str),
            Err(_) if *key == COOKIE => {
                // 非ASCIIを含むCookieもそのまま渡す（不正なトークンは変換側で捨てる）
                let lossy = String::from_utf8_lossy(value.as_bytes()).into_owned();
                request.append_header(key.as_str(), lossy);
            }
            Err(_) => warn!("Dropping non-visible header value for {}", key),
        }
    }
}

/// 共通形式のResponseからactix-webのHttpResponseに変換
fn convert_to_http_response(response: Response) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(response.status)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HttpResponse::build(status);

    // ヘッダーの設定
    for (key, value) in response.headers {
        builder.insert_header((key, value));
    }

    // ボディの設定
    if let Some(body) = response.body {
        builder.body(body)
    } else {
        builder.finish()
    }
}

/// アプリケーションをハンドリングするactix-web用ハンドラー
async fn handle_request(req: HttpRequest, app: web::Data<Arc<Cookie2Json>>) -> HttpResponse {
    info!("Received request: {} {}", req.method(), req.uri().path());

    let Some(request) = convert_request(&req) else {
        warn!("Unsupported method: {}", req.method());
        return HttpResponse::MethodNotAllowed().finish();
    };

    let response = match app.try_dispatch(&request).await {
        Ok(response) => response,
        Err(e) if e.is_callback_rejection() => {
            warn!("Rejected JSONP callback for {} {}: {}", request.method, request.path, e);
            Response::from_error(&e)
        }
        Err(e) => {
            if e.status_code() >= 500 {
                error!("Error handling {} {}: {}", request.method, request.path, e);
            }
            Response::from_error(&e)
        }
    };

    convert_to_http_response(response)
}

/// アプリケーションをCloud Run/HTTPサーバーとして実行
pub async fn run_cloud_run(app: Cookie2Json, host: &str, port: u16) -> std::io::Result<()> {
    info!("Starting HTTP server on {}:{}", host, port);

    // アプリケーションをArcで包んでスレッド間で共有可能にする
    let app_data = Arc::new(app);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_data.clone()))
            // すべてのリクエストをキャッチする汎用ハンドラー
            .default_service(web::to(handle_request))
    })
    .bind((host, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use crate::Configuration;

    fn app() -> Arc<Cookie2Json> {
        let config = Configuration::new()
            .enabled(true)
            .with_callback_name_from("cb");
        Arc::new(
            Cookie2Json::builder()
                .scope("^/.*$", config)
                .unwrap()
                .build(),
        )
    }

    #[actix_web::test]
    async fn test_multiple_cookie_headers_are_joined() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app()))
                .default_service(web::to(handle_request)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/?cb=fn")
            .append_header((COOKIE, "a=1; b=2"))
            .append_header((COOKIE, "c=3"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        assert_eq!(
            res.headers().get("content-type").unwrap().to_str().unwrap(),
            "text/javascript"
        );
        let body = test::read_body(res).await;
        assert_eq!(
            String::from_utf8(body.to_vec()).unwrap(),
            "fn({\n  status: 200,\n  body: { \"a\": \"1\", \"b\": \"2\", \"c\": \"3\" }\n});"
        );
    }

    #[actix_web::test]
    async fn test_rejected_callback_is_400() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app()))
                .default_service(web::to(handle_request)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/?cb=alert(1)")
            .append_header((COOKIE, "secret=1"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 400);
        let body = test::read_body(res).await;
        assert!(!String::from_utf8_lossy(&body).contains("secret"));
    }

    #[actix_web::test]
    async fn test_head_request_is_not_handled() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app()))
                .default_service(web::to(handle_request)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::HEAD)
            .uri("/")
            .append_header((COOKIE, "a=1"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 404);
    }
}
