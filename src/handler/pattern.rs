use log::warn;
use regex::Regex;

use crate::error::Error;

/// パターンの安全性を確保（アンカーの確認と追加）
pub fn ensure_safe_pattern(pattern: &str) -> Result<String, Error> {
    if pattern.is_empty() {
        return Err(Error::ConfigurationError("Empty path pattern is not allowed".to_string()));
    }

    let has_start_anchor = pattern.starts_with('^');
    let has_end_anchor = pattern.ends_with('$');

    if !has_start_anchor || !has_end_anchor {
        let safe_pattern = format!(
            "^{}$",
            pattern.trim_start_matches('^').trim_end_matches('$')
        );
        warn!(
            "Pattern '{}' lacks proper anchors, converted to '{}' for security",
            pattern,
            safe_pattern
        );
        Ok(safe_pattern)
    } else {
        Ok(pattern.to_string())
    }
}

/// アンカー付きのパターンをコンパイルする（不正なパターンは設定エラー）
pub fn compile_pattern(pattern: &str) -> Result<(String, Regex), Error> {
    let safe_pattern = ensure_safe_pattern(pattern)?;
    let regex = Regex::new(&safe_pattern).map_err(|e| {
        Error::ConfigurationError(format!("Invalid path pattern '{}': {}", safe_pattern, e))
    })?;
    Ok((safe_pattern, regex))
}
