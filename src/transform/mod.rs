//! CookieヘッダーをJSON/JSONPに変換するコア処理
//!
//! トークン分割、ホワイトリスト判定、コールバック検証、ボディ組み立てを行う。
//! 状態を持たず、設定は参照で受け取るだけなので並行リクエストから共有できる。

pub mod tokenizer;
pub mod whitelist;
pub mod callback;
pub mod cookies;
pub mod body;

pub use body::{ResponseBody, CONTENT_TYPE};
pub use callback::{resolve_callback, Callback};
pub use cookies::extract_cookies;
pub use tokenizer::KeyValuePair;
pub use whitelist::PrefixWhitelist;

use log::debug;

use crate::config::Configuration;
use crate::error::Error;

/// 1リクエスト分の変換を実行する
///
/// コールバックの検証に失敗した場合はボディを作らずにエラーを返す。
pub fn transform(
    config: &Configuration,
    cookie_header: Option<&str>,
    query_string: Option<&str>,
) -> Result<ResponseBody, Error> {
    let callback = resolve_callback(
        query_string,
        &config.callback_name_from,
        &config.callback_prefixes,
    )?;

    let pairs = extract_cookies(cookie_header, &config.cookie_prefixes);
    debug!("{} cookie pair(s) accepted", pairs.len());

    Ok(ResponseBody::build(&pairs, callback.as_ref()))
}
