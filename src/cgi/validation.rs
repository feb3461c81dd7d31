//! ヘッダーの検証機能

use crate::transform::tokenizer::is_c_space;

/// ヘッダー名が安全かどうか検証する（ASCII英数+ハイフンのみ）
pub fn is_valid_header_name(name: &str) -> bool {
    let b = name.as_bytes();
    !b.is_empty() && b.iter().all(|&c| c.is_ascii_alphanumeric() || c == b'-')
}

/// 出力するヘッダー値が安全かどうか検証する（ASCIIのホワイトリスト）
/// 許可: HTAB(0x09), SP(0x20), 可視ASCII(0x21–0x7E)
pub fn is_valid_header_value(value: &str) -> bool {
    value
        .as_bytes()
        .iter()
        .all(|&c| c == b'\t' || c == b' ' || (0x21..=0x7e).contains(&c))
}

/// Cookieヘッダー値を受け入れるか
///
/// トークン分割で読み飛ばす空白（`\v` `\f` `\r` `\n` を含む）は制御文字でも許可する。
pub fn is_acceptable_cookie_value(value: &str) -> bool {
    value
        .chars()
        .all(|c| !c.is_control() || (c.is_ascii() && is_c_space(c as u8)))
}

/// 受信したヘッダー値を受け入れるか（制御文字のみ拒否、非ASCIIは許可）
///
/// Cookieの値は変換側で不正なトークンを捨てるため、ここでは弾かない。
pub fn is_acceptable_input_value(value: &str) -> bool {
    value.chars().all(|c| c == '\t' || !c.is_control())
}
