//! 区切り文字によるトークン分割と `key=value` ペアの分解
//!
//! Cookieヘッダー（`,` と `;` の二段階）とクエリ文字列（`&` の一段階）の
//! 両方で同じプリミティブを使う。入力は変更せず、すべてスライスで返す。

use std::str::Split;

/// Cロケールの `isspace` と同じ判定（空白・タブ・改行・VT・FF・CR）
pub fn is_c_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// 先頭の空白のみを取り除く（末尾はそのまま）
pub fn skip_leading_space(token: &str) -> &str {
    let start = token
        .bytes()
        .position(|b| !is_c_space(b))
        .unwrap_or(token.len());
    &token[start..]
}

/// 分割済みのキーと値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValuePair<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// `split` が返す遅延トークン列
///
/// `Clone` で同じ入力を先頭から走査し直せる。
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    inner: Split<'a, char>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        for raw in self.inner.by_ref() {
            let token = skip_leading_space(raw);
            if !token.is_empty() {
                return Some(token);
            }
        }
        None
    }
}

/// 区切り文字で分割し、先頭空白を除いた空でないトークンを返す
pub fn split(input: &str, delimiter: char) -> Tokens<'_> {
    Tokens {
        inner: input.split(delimiter),
    }
}

/// トークンを最初の `=` でキーと値に分ける
///
/// `=` が無い、または先頭が `=` のトークンは `None`。値は空でもよく、トリムしない。
pub fn split_pair(token: &str) -> Option<KeyValuePair<'_>> {
    match token.find('=') {
        Some(0) | None => None,
        Some(i) => Some(KeyValuePair {
            key: &token[..i],
            value: &token[i + 1..],
        }),
    }
}

/// トークンごとの分解結果を返す（不正なトークンは `None`）
pub fn pairs(input: &str, delimiter: char) -> impl Iterator<Item = Option<KeyValuePair<'_>>> + Clone {
    split(input, delimiter).map(split_pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_skips_leading_space_and_empty_tokens() {
        let tokens: Vec<&str> = split(";; a=1;  \t b=2 ;   ;c=3", ';').collect();
        assert_eq!(tokens, vec!["a=1", "b=2 ", "c=3"]);
    }

    #[test]
    fn test_split_empty_input() {
        assert_eq!(split("", ',').count(), 0);
        assert_eq!(split(" , ,\t", ',').count(), 0);
    }

    #[test]
    fn test_split_is_restartable() {
        let tokens = split("a&b&c", '&');
        let first: Vec<&str> = tokens.clone().collect();
        let second: Vec<&str> = tokens.collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_vertical_tab_and_form_feed_are_space() {
        let tokens: Vec<&str> = split("\x0b\x0ckey=v", ';').collect();
        assert_eq!(tokens, vec!["key=v"]);
        // 非ASCIIの空白は対象外
        let tokens: Vec<&str> = split("\u{a0}key=v", ';').collect();
        assert_eq!(tokens, vec!["\u{a0}key=v"]);
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(
            split_pair("a=1"),
            Some(KeyValuePair { key: "a", value: "1" })
        );
        assert_eq!(
            split_pair("a="),
            Some(KeyValuePair { key: "a", value: "" })
        );
        assert_eq!(
            split_pair("a=b=c"),
            Some(KeyValuePair { key: "a", value: "b=c" })
        );
        assert_eq!(
            split_pair("a= spaced "),
            Some(KeyValuePair { key: "a", value: " spaced " })
        );
    }

    #[test]
    fn test_split_pair_garbage() {
        assert_eq!(split_pair("=badkey"), None);
        assert_eq!(split_pair("novalue"), None);
        assert_eq!(split_pair("="), None);
    }

    #[test]
    fn test_pairs_keeps_malformed_as_none() {
        let result: Vec<_> = pairs("a=1&junk&=x&b=2", '&').collect();
        assert_eq!(result.len(), 4);
        assert!(result[1].is_none());
        assert!(result[2].is_none());
        let kept: Vec<(String, String)> = result
            .into_iter()
            .flatten()
            .map(|p| (p.key.to_string(), p.value.to_string()))
            .collect();
        assert_eq!(
            kept,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }
}
