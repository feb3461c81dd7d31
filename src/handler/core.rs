use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;

use crate::common::{Handler, Method, Request, Response};
use crate::config::Configuration;
use crate::error::Error;
use crate::transform::{transform, CONTENT_TYPE};

use super::pattern::compile_pattern;

/// CookieヘッダーをJSON/JSONPで返すハンドラー
///
/// パスパターン1つと設定1つの組（スコープ）を表す。設定は `Arc` で共有し、
/// リクエスト処理中は読み取るだけ。
pub struct CookieJsonHandler {
    /// ルートパス（正規表現パターン）
    pub path_pattern: String,
    /// コンパイル済み正規表現
    compiled_regex: Regex,
    /// スコープの設定
    config: Arc<Configuration>,
}

impl CookieJsonHandler {
    /// 新しいCookieJsonHandlerを作成
    pub fn try_new(path_pattern: impl Into<String>, config: Configuration) -> Result<Self, Error> {
        Self::with_shared_config(path_pattern, Arc::new(config))
    }

    /// 共有済みの設定からCookieJsonHandlerを作成
    pub fn with_shared_config(
        path_pattern: impl Into<String>,
        config: Arc<Configuration>,
    ) -> Result<Self, Error> {
        let pattern = path_pattern.into();
        let (safe_pattern, compiled_regex) = compile_pattern(&pattern)?;

        // 開発時はinfo、本番相当ではdebugに落とす
        #[cfg(debug_assertions)]
        info!(
            "Registering cookie2json handler with pattern: {} (enabled: {})",
            safe_pattern, config.enabled
        );
        #[cfg(not(debug_assertions))]
        debug!(
            "Registering cookie2json handler with pattern: {} (enabled: {})",
            safe_pattern, config.enabled
        );

        Ok(Self {
            path_pattern: safe_pattern,
            compiled_regex,
            config,
        })
    }

    /// 処理を辞退する理由（処理する場合は `None`）
    fn decline_reason(&self, req: &Request) -> Option<&'static str> {
        if !self.config.enabled {
            Some("disabled")
        } else if req.is_subrequest {
            Some("sub-request")
        } else if req.is_head() {
            Some("HEAD request")
        } else {
            None
        }
    }

    /// リクエストを変換する（同期処理）
    ///
    /// 辞退した場合は `Ok(None)`、コールバック検証に失敗した場合は `Err`。
    pub fn process(&self, req: &Request) -> Result<Option<Response>, Error> {
        if let Some(reason) = self.decline_reason(req) {
            debug!("Declining {} {}: {}", req.method, req.path, reason);
            return Ok(None);
        }

        let body = transform(&self.config, req.cookie_header(), req.query_string.as_deref())
            .map_err(|e| {
                warn!("Rejecting {} {}: {}", req.method, req.path, e);
                e
            })?;

        debug!(
            "Responding to {} {} with {} body",
            req.method,
            req.path,
            if body.is_jsonp() { "JSONP" } else { "JSON" }
        );

        Ok(Some(
            Response::ok()
                .with_header("Content-Type", CONTENT_TYPE)
                .with_body(body.into_string().into_bytes()),
        ))
    }
}

#[async_trait]
impl Handler for CookieJsonHandler {
    fn matches(&self, path: &str, _method: &Method) -> bool {
        let is_match = self.compiled_regex.is_match(path);
        debug!(
            "Path matching: {} against pattern {}: {}",
            path, self.path_pattern, is_match
        );
        is_match
    }

    fn path_pattern(&self) -> &str {
        &self.path_pattern
    }

    async fn handle(&self, req: &Request) -> Result<Option<Response>, Error> {
        self.process(req)
    }
}
