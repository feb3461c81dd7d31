//! JSONPコールバック名の抽出と検証
//!
//! コールバック名はそのままレスポンスのJavaScriptに埋め込まれるため、
//! 文字種は許可リスト方式で判定する。

use log::{debug, trace, warn};

use crate::error::Error;
use super::tokenizer::pairs;
use super::whitelist::PrefixWhitelist;

/// コールバック名に使えるバイトの表（`.` `0-9` `A-Z` `_` `a-z`）
static CALLBACK_CHAR_TABLE: [bool; 256] = build_callback_char_table();

const fn build_callback_char_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = b == b'.'
            || b == b'_'
            || b.is_ascii_digit()
            || b.is_ascii_uppercase()
            || b.is_ascii_lowercase();
        i += 1;
    }
    table
}

/// バイトがコールバック名に使えるか
pub fn is_valid_callback_byte(byte: u8) -> bool {
    CALLBACK_CHAR_TABLE[byte as usize]
}

/// 最初に見つかった使用不可の文字を返す（すべて許可なら `None`）
pub fn first_unsafe_char(candidate: &str) -> Option<char> {
    candidate
        .chars()
        .find(|&c| !(c.is_ascii() && is_valid_callback_byte(c as u8)))
}

/// 検証済みのコールバック名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback(String);

impl Callback {
    /// 文字種とプレフィックスを検証してコールバック名を作る
    pub fn validate(candidate: &str, prefixes: &PrefixWhitelist) -> Result<Self, Error> {
        if let Some(character) = first_unsafe_char(candidate) {
            warn!(
                "found unsafe character {:?} in JSONP callback {:?}; rejecting request",
                character, candidate
            );
            return Err(Error::UnsafeCallbackCharacter {
                callback: candidate.to_string(),
                character,
            });
        }

        if !prefixes.matches(candidate) {
            warn!("found disallowed callback {:?} in JSONP; rejecting request", candidate);
            return Err(Error::DisallowedCallbackPrefix(candidate.to_string()));
        }

        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// クエリ文字列からコールバック名を取り出して検証する
///
/// `name_from` と大文字小文字を無視して一致する最初のキーだけを見る。
/// 該当キーが無ければ `Ok(None)`、検証に失敗したら `Err`。
/// 値が空のコールバックは受理されてもラップしないので `Ok(None)` になる。
pub fn resolve_callback(
    query: Option<&str>,
    name_from: &str,
    prefixes: &PrefixWhitelist,
) -> Result<Option<Callback>, Error> {
    if name_from.is_empty() {
        return Ok(None);
    }
    let query = match query {
        Some(q) if q.len() > 1 => q,
        _ => return Ok(None),
    };

    let candidate = pairs(query, '&')
        .inspect(|pair| {
            if pair.is_none() {
                trace!("skipping malformed query string token");
            }
        })
        .flatten()
        .find(|pair| pair.key.eq_ignore_ascii_case(name_from));

    let Some(pair) = candidate else {
        debug!("no {:?} parameter in query string", name_from);
        return Ok(None);
    };

    debug!("validating callback {:?}", pair.value);
    let callback = Callback::validate(pair.value, prefixes)?;
    if callback.as_str().is_empty() {
        return Ok(None);
    }
    debug!("using {:?} as the callback name", callback.as_str());
    Ok(Some(callback))
}
