//! プレフィックスによるホワイトリスト

use serde::{Deserialize, Serialize};

/// 大文字小文字を区別しないプレフィックスのホワイトリスト
///
/// 空のリストは「制限なし」を意味する。設定読み込み時に一度だけ構築し、
/// リクエスト処理中は読み取り専用で共有する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixWhitelist {
    prefixes: Vec<String>,
}

impl PrefixWhitelist {
    /// 空のホワイトリストを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プレフィックスを末尾に追加（設定時のみ）
    pub fn push(&mut self, prefix: impl Into<String>) {
        self.prefixes.push(prefix.into());
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// 設定順にプレフィックスを返す
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    /// 候補がいずれかのプレフィックスで始まるか（空なら常に真）
    pub fn matches(&self, candidate: &str) -> bool {
        self.is_empty() || self.matching_prefix(candidate).is_some()
    }

    /// 最初にマッチしたプレフィックスを返す
    pub fn matching_prefix(&self, candidate: &str) -> Option<&str> {
        self.iter()
            .find(|prefix| starts_with_ignore_ascii_case(candidate, prefix))
    }
}

impl<S: Into<String>> FromIterator<S> for PrefixWhitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            prefixes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for PrefixWhitelist {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.prefixes.extend(iter.into_iter().map(Into::into));
    }
}

/// バイト単位でASCIIの大文字小文字を無視した前方一致
fn starts_with_ignore_ascii_case(candidate: &str, prefix: &str) -> bool {
    let candidate = candidate.as_bytes();
    let prefix = prefix.as_bytes();
    candidate.len() >= prefix.len() && candidate[..prefix.len()].eq_ignore_ascii_case(prefix)
}
