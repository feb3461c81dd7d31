//! CGI環境での実行をサポートするモジュール
//!
//! 環境変数からリクエストを構築し、
//! 標準出力にCGIレスポンスフォーマットで出力するための機能を提供します。

pub mod validation;
pub mod error_logging;
pub mod request;
pub mod response;
pub mod core;

pub use core::{run_cgi, run_cgi_with_writer};
pub use response::{write_response_to, CgiWriter};
