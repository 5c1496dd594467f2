#![forbid(unsafe_code)]

//! HTML encoding for text that ends up inside dialog markup.

use std::borrow::Cow;

/// Encode `text` for safe insertion as markup.
///
/// `<`, `>`, `&`, `"` and `'` become entities and line breaks become
/// `<br />`. Input with nothing to encode (including the empty string) is
/// returned unchanged without allocating. This is not reversible: line
/// breaks stay `<br />`.
///
/// ```
/// use hostdialog::html_encode;
///
/// assert_eq!(html_encode("<a> & \n"), "&lt;a&gt; &amp; <br />");
/// assert_eq!(html_encode(""), "");
/// ```
pub fn html_encode(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '&', '"', '\'', '\n']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // CRLF collapses into the following break.
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => out.push_str("<br />"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
