//! cookie2json: CookieヘッダーをJSON/JSONPとして返すリクエスト変換
//!
//! コアの変換処理（`transform`）と、それをCGI・HTTPサーバーから
//! 呼び出すためのハンドラー/アダプターを提供する。

// --- Feature validation -----------------------------------------------------
// 実行環境featureが同時に有効化されている場合はコンパイルエラーを出す。
// 対象: "cloud_run" / "cgi"
#[cfg(all(
    feature = "cloud_run",
    feature = "cgi",
    not(feature = "allow_feature_conflicts")
))]
compile_error!(
    "Conflicting features: 'cloud_run' and 'cgi' cannot be enabled together. Choose exactly one."
);

pub mod common;
pub mod config;
pub mod error;
pub mod handler;
pub mod transform;

#[cfg(feature = "cloud_run")]
pub mod cloudrun;

#[cfg(feature = "cgi")]
pub mod cgi;

pub use common::*;
pub use config::Configuration;
pub use error::*;
pub use handler::CookieJsonHandler;

use log::{debug, error};

/// リクエストを処理するアプリケーションを構築するためのビルダー
#[derive(Default)]
pub struct Cookie2JsonBuilder {
    handlers: Vec<Box<dyn common::Handler>>,
}

impl Cookie2JsonBuilder {
    /// 新しいCookie2JsonBuilderインスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ハンドラを追加
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: common::Handler + 'static
    {
        self.handlers.push(Box::new(handler));
        // ハンドラーを追加するたびにパスの `/` の数で降順ソート（より具体的なスコープを優先）
        self.handlers.sort_by(|a, b| {
            let count_a = a.path_pattern().matches('/').count();
            let count_b = b.path_pattern().matches('/').count();
            // 降順ソート (多い方が先)
            count_b.cmp(&count_a)
        });
        self
    }

    /// 設定とパスパターンからスコープを追加
    pub fn scope(
        self,
        path_pattern: impl Into<String>,
        config: Configuration,
    ) -> Result<Self, Error> {
        let handler = CookieJsonHandler::try_new(path_pattern, config)?;
        Ok(self.handler(handler))
    }

    /// アプリケーションをビルドして返却
    pub fn build(self) -> Cookie2Json {
        Cookie2Json {
            handlers: self.handlers,
        }
    }
}

/// リクエストを処理するアプリケーション
pub struct Cookie2Json {
    handlers: Vec<Box<dyn common::Handler>>,
}

impl Cookie2Json {
    /// 新しいCookie2JsonBuilderインスタンスを作成
    pub fn builder() -> Cookie2JsonBuilder {
        Cookie2JsonBuilder::new()
    }

    /// 指定されたパスにマッチするハンドラを優先順に列挙
    pub fn matching_handlers<'a>(
        &'a self,
        path: &'a str,
        method: &'a common::Method,
    ) -> impl Iterator<Item = &'a dyn common::Handler> + 'a {
        self.handlers
            .iter()
            .map(|h| h.as_ref())
            .filter(move |h| h.matches(path, method))
    }

    /// リクエストを処理してレスポンスを返す
    ///
    /// 最も具体的にマッチしたハンドラだけが処理する（上位スコープへのフォールバックはしない）。
    /// マッチしない、または辞退した場合は `RouteNotFound`。
    pub async fn try_dispatch(&self, req: &common::Request) -> Result<common::Response, Error> {
        let not_found = || Error::RouteNotFound(format!("{} {}", req.method, req.path));
        let handler = self
            .matching_handlers(&req.path, &req.method)
            .next()
            .ok_or_else(not_found)?;
        match handler.handle(req).await? {
            Some(response) => Ok(response),
            None => {
                debug!("Handler {} declined {} {}", handler.path_pattern(), req.method, req.path);
                Err(not_found())
            }
        }
    }

    /// リクエストを処理し、エラーは固定メッセージのレスポンスに変換する
    pub async fn dispatch(&self, req: &common::Request) -> common::Response {
        match self.try_dispatch(req).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request {} {} ended with: {}", req.method, req.path, e);
                common::Response::from_error(&e)
            }
        }
    }
}

/// レスポンスを書き込み先へ送り、最終的なステータスコードを返す
///
/// 書き込みに失敗した場合は 500 を返す（ボディはすでに組み立て済みで、
/// 部分的な送信はしない）。
pub fn deliver<W: common::ResponseWriter + ?Sized>(
    response: &common::Response,
    writer: &mut W,
) -> u16 {
    match writer.write_response(response) {
        Ok(()) => response.status,
        Err(e) => {
            error!("Failed to deliver response: {}", e);
            common::StatusCode::InternalServerError.as_u16()
        }
    }
}
