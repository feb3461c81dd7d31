//! HTTP関連の基本型

use std::collections::HashMap;
use std::fmt;

/// HTTPステータスコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    // 2xx Success
    Ok = 200,

    // 4xx Client Error
    BadRequest = 400,
    NotFound = 404,

    // 5xx Server Error
    InternalServerError = 500,
}

impl StatusCode {
    /// u16の値を取得
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// u16から変換
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }

    /// 理由句を取得
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> u16 {
        status.as_u16()
    }
}

/// HTTPメソッド
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::GET => write!(f, "GET"),
            Method::POST => write!(f, "POST"),
            Method::PUT => write!(f, "PUT"),
            Method::DELETE => write!(f, "DELETE"),
            Method::PATCH => write!(f, "PATCH"),
            Method::HEAD => write!(f, "HEAD"),
            Method::OPTIONS => write!(f, "OPTIONS"),
        }
    }
}

impl Method {
    /// 文字列からMethodに変換
    pub fn from_str(method: &str) -> Option<Self> {
        match method.to_uppercase().as_str() {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "PATCH" => Some(Method::PATCH),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            _ => None,
        }
    }
}

/// HTTPリクエスト
///
/// ヘッダー名は小文字に正規化して保持する。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTPメソッド
    pub method: Method,
    /// リクエストパス
    pub path: String,
    /// クエリ文字列（先頭の `?` を含まない、デコードしない）
    pub query_string: Option<String>,
    /// HTTPヘッダー
    pub headers: HashMap<String, String>,
    /// 別リクエストから派生したサブリクエストか
    pub is_subrequest: bool,
}

impl Request {
    /// 新しいリクエストを作成
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_string: None,
            headers: HashMap::new(),
            is_subrequest: false,
        }
    }

    /// クエリ文字列を設定（空文字列は「なし」として扱う）
    pub fn with_query_string(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query_string = if query.is_empty() { None } else { Some(query) };
        self
    }

    /// ヘッダーを設定（同名のヘッダーは置き換える）
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// ヘッダーを追加（同名のヘッダーがあれば `, ` で連結する）
    pub fn append_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        self.headers
            .entry(key.into().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.clone());
    }

    /// サブリクエストとして印を付ける
    pub fn as_subrequest(mut self) -> Self {
        self.is_subrequest = true;
        self
    }

    /// ヘッダー値を取得（名前の大文字小文字は無視）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Cookieヘッダーを取得
    pub fn cookie_header(&self) -> Option<&str> {
        self.header("cookie")
    }

    /// HEADリクエストかどうか
    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

/// HTTPレスポンス
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTPステータスコード
    pub status: u16,
    /// HTTPヘッダー
    pub headers: HashMap<String, String>,
    /// レスポンスボディ
    pub body: Option<Vec<u8>>,
}

impl Response {
    /// 新しいレスポンスを作成
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// StatusCodeから新しいレスポンスを作成
    pub fn with_status(status: StatusCode) -> Self {
        Self::new(status.as_u16())
    }

    /// ヘッダーを追加
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// ボディを追加
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// ヘッダー値を取得（名前の大文字小文字は無視）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 200 OKレスポンスを作成
    pub fn ok() -> Self {
        Self::with_status(StatusCode::Ok)
    }

    /// 400 Bad Requestレスポンスを作成
    pub fn bad_request() -> Self {
        Self::with_status(StatusCode::BadRequest)
    }

    /// 404 Not Foundレスポンスを作成
    pub fn not_found() -> Self {
        Self::with_status(StatusCode::NotFound)
    }

    /// 500 Internal Server Errorレスポンスを作成
    pub fn internal_server_error() -> Self {
        Self::with_status(StatusCode::InternalServerError)
    }

    /// Error型から固定メッセージのレスポンスを生成
    ///
    /// リクエスト由来の値（コールバック名やCookie）は本文に含めない。
    pub fn from_error(error: &crate::error::Error) -> Self {
        let status = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::InternalServerError);
        let response = match status {
            StatusCode::Ok => Self::ok(),
            StatusCode::BadRequest => Self::bad_request(),
            StatusCode::NotFound => Self::not_found(),
            StatusCode::InternalServerError => Self::internal_server_error(),
        };
        let message = status.reason_phrase();
        response
            .with_header("Content-Type", "text/plain")
            .with_body(message.as_bytes().to_vec())
    }
}
