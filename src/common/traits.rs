//! コアトレイト定義（Handler、ResponseWriter）

use async_trait::async_trait;
use crate::error::Error;
use super::http::{Request, Response, Method};

/// ハンドラーの特性
#[async_trait]
pub trait Handler: Send + Sync {
    /// パスとメソッドがこのハンドラにマッチするかどうかを判定
    fn matches(&self, path: &str, method: &Method) -> bool;

    /// ハンドラに関連付けられたパスパターン文字列を取得
    fn path_pattern(&self) -> &str;

    /// リクエストを処理
    ///
    /// `Ok(None)` は処理を辞退したことを表し、次のハンドラに委ねる。
    async fn handle(&self, req: &Request) -> Result<Option<Response>, Error>;
}

/// 組み立て済みのレスポンスをクライアントへ送る書き込み先
pub trait ResponseWriter {
    /// レスポンスを送信する
    fn write_response(&mut self, response: &Response) -> Result<(), Error>;
}
