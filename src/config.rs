//! 設定の読み込み
//!
//! 設定は起動時に一度だけ構築し、以後は読み取り専用で共有する。
//! 読み込み元はディレクティブ形式のファイル、JSONファイル、環境変数の3種類。

use std::env;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::transform::PrefixWhitelist;

/// 有効/無効を切り替えるディレクティブ
pub const DIRECTIVE_ENABLE: &str = "C2JSON";
/// コールバック名を取り出すクエリパラメータ名
pub const DIRECTIVE_CALLBACK_NAME_FROM: &str = "C2JSONCallBackNameFrom";
/// コールバック名のプレフィックス（複数可）
pub const DIRECTIVE_CALLBACK_PREFIX: &str = "C2JSONCallBackPrefix";
/// 出力するCookieキーのプレフィックス（複数可）
pub const DIRECTIVE_COOKIE_PREFIX: &str = "C2JSONPrefix";

/// 設定ファイルのパスを指定する環境変数
pub const CONFIG_PATH_ENV: &str = "COOKIE2JSON_CONFIG";

/// 変換の設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// 変換を有効にするか
    pub enabled: bool,
    /// コールバック名を取り出すクエリパラメータ名（空なら無効）
    pub callback_name_from: String,
    /// 出力するCookieキーのプレフィックス
    pub cookie_prefixes: PrefixWhitelist,
    /// コールバック名に要求するプレフィックス
    pub callback_prefixes: PrefixWhitelist,
}

impl Configuration {
    /// 無効状態の設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 有効フラグを設定
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// コールバック名のパラメータを設定
    pub fn with_callback_name_from(mut self, name: impl Into<String>) -> Self {
        self.callback_name_from = name.into();
        self
    }

    /// Cookieキーのプレフィックスを追加
    pub fn with_cookie_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cookie_prefixes.push(prefix);
        self
    }

    /// コールバック名のプレフィックスを追加
    pub fn with_callback_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.callback_prefixes.push(prefix);
        self
    }

    /// ディレクティブ形式のテキストから設定を構築
    ///
    /// ```text
    /// C2JSON On
    /// C2JSONCallBackNameFrom callback
    /// C2JSONCallBackPrefix jsonp_ app.
    /// C2JSONPrefix session user_
    /// C2JSONPrefix "has space"
    /// ```
    ///
    /// 引数は空白区切りで、`"..."` または `'...'` で囲むと空白を含められる
    /// （囲み内では `\"` / `\'` で引用符を書ける）。
    pub fn from_directives(text: &str) -> Result<Self, Error> {
        let mut config = Self::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let words = split_directive_words(line);
            let Some((name, rest)) = words.split_first() else {
                continue;
            };
            let args: Vec<&str> = rest.iter().map(String::as_str).collect();
            config
                .apply_directive(name, &args)
                .map_err(|e| match e {
                    Error::ConfigurationError(msg) => {
                        Error::ConfigurationError(format!("line {}: {}", index + 1, msg))
                    }
                    other => other,
                })?;
        }
        Ok(config)
    }

    /// 1つのディレクティブを適用
    pub fn apply_directive(&mut self, name: &str, args: &[&str]) -> Result<(), Error> {
        if name.eq_ignore_ascii_case(DIRECTIVE_ENABLE) {
            let [value] = args else {
                return Err(Error::ConfigurationError(format!(
                    "{} takes one argument, On or Off",
                    name
                )));
            };
            self.enabled = parse_flag(name, value)?;
        } else if name.eq_ignore_ascii_case(DIRECTIVE_CALLBACK_NAME_FROM) {
            match args {
                [] | [""] => return Err(null_value(name)),
                [value] => self.callback_name_from = (*value).to_string(),
                _ => {
                    return Err(Error::ConfigurationError(format!(
                        "{} takes one argument",
                        name
                    )))
                }
            }
        } else if name.eq_ignore_ascii_case(DIRECTIVE_CALLBACK_PREFIX) {
            if args.is_empty() || args.iter().any(|a| a.is_empty()) {
                return Err(null_value(name));
            }
            self.callback_prefixes.extend(args.iter().copied());
        } else if name.eq_ignore_ascii_case(DIRECTIVE_COOKIE_PREFIX) {
            if args.is_empty() || args.iter().any(|a| a.is_empty()) {
                return Err(null_value(name));
            }
            self.cookie_prefixes.extend(args.iter().copied());
        } else {
            return Err(Error::ConfigurationError(format!("No such variable {}", name)));
        }
        Ok(())
    }

    /// JSON文字列から設定を構築
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigurationError(format!("Invalid JSON configuration: {}", e)))?;
        if config.cookie_prefixes.iter().any(str::is_empty)
            || config.callback_prefixes.iter().any(str::is_empty)
        {
            return Err(Error::ConfigurationError(
                "prefixes not allowed to be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// 環境変数から設定を構築
    ///
    /// `C2JSON`, `C2JSON_CALLBACK_NAME_FROM`, `C2JSON_CALLBACK_PREFIX`,
    /// `C2JSON_PREFIX`。リストは空白またはカンマ区切り。
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::new();
        if let Ok(value) = env::var("C2JSON") {
            config.enabled = parse_flag("C2JSON", value.trim())?;
        }
        if let Ok(value) = env::var("C2JSON_CALLBACK_NAME_FROM") {
            config.callback_name_from = value.trim().to_string();
        }
        if let Ok(value) = env::var("C2JSON_CALLBACK_PREFIX") {
            config.callback_prefixes.extend(split_list(&value));
        }
        if let Ok(value) = env::var("C2JSON_PREFIX") {
            config.cookie_prefixes.extend(split_list(&value));
        }
        Ok(config)
    }

    /// ファイルから設定を読み込む（拡張子 `.json` ならJSON、それ以外はディレクティブ）
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::ConfigurationError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_directives(&text)
        }
    }

    /// 起動時の設定読み込み
    /// 優先順位: 環境変数 `COOKIE2JSON_CONFIG` のファイル -> 個別の環境変数
    pub fn load() -> Result<Self, Error> {
        let config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => {
                info!("Loading configuration from {}", path);
                Self::from_file(&path)?
            }
            _ => Self::from_env()?,
        };
        debug!(
            "configuration: enabled={}, callback_name_from={:?}, cookie_prefixes={}, callback_prefixes={}",
            config.enabled,
            config.callback_name_from,
            config.cookie_prefixes.len(),
            config.callback_prefixes.len()
        );
        Ok(config)
    }
}

fn null_value(name: &str) -> Error {
    Error::ConfigurationError(format!("{} not allowed to be NULL", name))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(Error::ConfigurationError(format!(
            "{} must be On or Off, got {:?}",
            name, value
        ))),
    }
}

/// ディレクティブ行を単語に分割する（引用符で囲まれた単語は1語）
///
/// 閉じ引用符が無い場合は行末までを1語とする。
fn split_directive_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };
        let mut word = String::new();
        if first == '"' || first == '\'' {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '\\' && chars.peek() == Some(&first) {
                    word.push(first);
                    chars.next();
                } else if c == first {
                    break;
                } else {
                    word.push(c);
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                word.push(c);
            }
        }
        words.push(word);
    }
    words
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}
