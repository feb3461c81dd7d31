//! JSON / JSONP レスポンスボディの組み立て
//!
//! キーも値もエスケープせずに埋め込む。既存クライアントがこのバイト列に
//! 依存しているため、`"` や制御文字を含む値は壊れたJSONになり得る。

use super::callback::Callback;
use super::tokenizer::KeyValuePair;

/// 成功時のContent-Type
pub const CONTENT_TYPE: &str = "text/javascript";

/// 組み立て済みのレスポンスボディ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    json: String,
    jsonp: Option<String>,
}

impl ResponseBody {
    /// ペアとコールバックからボディを作成
    pub fn build(pairs: &[KeyValuePair<'_>], callback: Option<&Callback>) -> Self {
        let json = render_json(pairs);
        let jsonp = callback.map(|cb| wrap_jsonp(cb.as_str(), &json));
        Self { json, jsonp }
    }

    /// ラップ前のJSONオブジェクト
    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn is_jsonp(&self) -> bool {
        self.jsonp.is_some()
    }

    /// 送信するテキスト（コールバックがあればJSONP）
    pub fn as_str(&self) -> &str {
        self.jsonp.as_deref().unwrap_or(&self.json)
    }

    pub fn into_string(self) -> String {
        self.jsonp.unwrap_or(self.json)
    }
}

/// `{ "k": "v", ... }` 形式で出現順に並べる
pub fn render_json(pairs: &[KeyValuePair<'_>]) -> String {
    let mut members = String::new();
    for pair in pairs {
        if !members.is_empty() {
            members.push_str(", ");
        }
        members.push('"');
        members.push_str(pair.key);
        members.push_str("\": \"");
        members.push_str(pair.value);
        members.push('"');
    }
    format!("{{ {} }}", members)
}

/// JSONをコールバック呼び出しで包む
pub fn wrap_jsonp(callback: &str, json: &str) -> String {
    format!("{}({{\n  status: 200,\n  body: {}\n}});", callback, json)
}
