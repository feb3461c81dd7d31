//! Cookieヘッダーからのキー/値の抽出

use log::trace;

use super::tokenizer::{split, split_pair, KeyValuePair};
use super::whitelist::PrefixWhitelist;

/// Cookieヘッダーからホワイトリストを通過したペアを出現順に取り出す
///
/// 1つのヘッダーに `;` で連結された場合（`a=1; b=2`）と、複数ヘッダーが
/// `,` で畳み込まれた場合（`a=1, b=2`）、その混在（`a=1, b=2; c=3`）を扱う。
/// 不正なトークンは黙って捨てる。
pub fn extract_cookies<'a>(
    header: Option<&'a str>,
    prefixes: &PrefixWhitelist,
) -> Vec<KeyValuePair<'a>> {
    let Some(header) = header else {
        trace!("no cookie header present");
        return Vec::new();
    };

    split(header, ',')
        .flat_map(|directive| split(directive, ';'))
        .filter_map(|token| {
            let pair = split_pair(token);
            if pair.is_none() {
                trace!("dropping malformed cookie token {:?}", token);
            }
            pair
        })
        .filter(|pair| {
            let allowed = prefixes.matches(pair.key);
            if !allowed {
                trace!("cookie {:?} is not on the whitelist - skipping", pair.key);
            }
            allowed
        })
        .collect()
}
