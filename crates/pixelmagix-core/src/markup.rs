//! Small string helpers for working with rendered HTML documents.

/// Escapes text for use in element content or a double-quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Byte offset of the first opening tag named `name`, ignoring case.
///
/// `<header>` does not match `head`.
pub fn find_open_tag(html: &str, name: &str) -> Option<usize> {
    let pattern = format!("<{name}");
    let mut from = 0;
    while let Some(pos) = find_ignore_case(&html[from..], &pattern) {
        let at = from + pos;
        let after = at + pattern.len();
        match html.as_bytes().get(after) {
            Some(b) if *b == b'>' || b.is_ascii_whitespace() || *b == b'/' => return Some(at),
            Some(_) => from = after,
            None => return None,
        }
    }
    None
}

/// Inserts `fragment` on a new line right after the opening `<head>` tag.
///
/// Returns `None` when the document has no `<head>`.
pub fn insert_after_head(html: &str, fragment: &str) -> Option<String> {
    let start = find_open_tag(html, "head")?;
    let close = html[start..].find('>')? + start + 1;
    let mut out = String::with_capacity(html.len() + fragment.len() + 1);
    out.push_str(&html[..close]);
    out.push('\n');
    out.push_str(fragment);
    out.push_str(&html[close..]);
    Some(out)
}

/// Inserts `fragment` right before the closing `</body>` tag.
///
/// Returns `None` when the document has no `</body>`.
pub fn insert_before_body_end(html: &str, fragment: &str) -> Option<String> {
    let at = find_ignore_case(html, "</body>")?;
    let mut out = String::with_capacity(html.len() + fragment.len() + 1);
    out.push_str(&html[..at]);
    out.push_str(fragment);
    out.push('\n');
    out.push_str(&html[at..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_insert_after_head() {
        let html = "<html><HEAD lang=\"en\"><title>t</title></HEAD></html>";
        let out = insert_after_head(html, "<meta>").unwrap();
        assert_eq!(out, "<html><HEAD lang=\"en\">\n<meta><title>t</title></HEAD></html>");
        assert!(insert_after_head("<p>no head</p>", "<meta>").is_none());
        assert!(insert_after_head("<header>x</header>", "<meta>").is_none());
    }

    #[test]
    fn test_insert_before_body_end() {
        let out = insert_before_body_end("<body><p>x</p></body>", "<form></form>").unwrap();
        assert_eq!(out, "<body><p>x</p><form></form>\n</body>");
        assert!(insert_before_body_end("<p>x</p>", "<form>").is_none());
    }
}
