//! 共通の抽象化レイヤーとトレイト定義

pub mod http;
pub mod traits;
pub mod utils;

pub use http::{Method, Request, Response, StatusCode};
pub use traits::{Handler, ResponseWriter};
pub use utils::*;
