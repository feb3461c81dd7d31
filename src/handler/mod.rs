//! ハンドラーの実装（分割モジュール）

pub mod pattern;
pub mod core;

pub use core::CookieJsonHandler;
pub use pattern::ensure_safe_pattern;
