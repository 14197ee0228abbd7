// src/markup.rs
//
// Byte-level helpers for the inline tag vocabulary.
//
// - Tags are scanned on raw bytes; every byte we branch on is ASCII, so any
//   offset returned here is also a valid `str` char boundary.
// - Tag ends are quote-aware: `<a href="x>y">` ends at the last '>'.
// - Names are compared ASCII case-insensitively.

/* =============================== Core sets =============================== */

/// Tags the chunker knows how to carry across a chunk boundary.
pub const INLINE_TAGS: &[&[u8]] = &[b"b", b"i", b"u", b"s", b"a", b"code", b"pre"];

pub fn is_inline(name: &[u8]) -> bool {
    matches_ignore_ascii_case(name, INLINE_TAGS)
}

pub fn is_void(name: &[u8]) -> bool {
    matches_ignore_ascii_case(
        name,
        &[
            b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
            b"param", b"source", b"track", b"wbr",
        ],
    )
}

/// Elements whose whole content is discarded by the sanitizer.
pub fn is_raw_text(name: &[u8]) -> bool {
    matches_ignore_ascii_case(
        name,
        &[b"script", b"style", b"textarea", b"xmp", b"title", b"noscript", b"iframe"],
    )
}

/* ============================ Utility predicates ========================= */

#[inline]
pub fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

#[inline]
pub fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'
}

pub fn matches_ignore_ascii_case(name: &[u8], set: &[&[u8]]) -> bool {
    set.iter().any(|&s| name.eq_ignore_ascii_case(s))
}

/* =============================== Tag parsing ============================= */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagInfo<'a> {
    pub name: &'a [u8],
    pub is_end: bool,
    pub self_closing: bool,
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware.
pub fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Extract tag name, end/self-closing flags from raw `<...>` bytes.
pub fn parse_tag_info(tag: &[u8]) -> TagInfo<'_> {
    let n = tag.len();
    let mut i = 1;

    let mut is_end = false;
    if i < n && tag[i] == b'/' {
        is_end = true;
        i += 1;
    }
    let start = i;
    while i < n && is_name_char(tag[i]) {
        i += 1;
    }
    let name = &tag[start..i];

    // self-closing? check before '>'
    let mut j = n.saturating_sub(1);
    while j > 0 && is_ws(tag[j - 1]) {
        j -= 1;
    }
    let self_closing = j >= 2 && tag[j - 1] == b'/';

    TagInfo {
        name,
        is_end,
        self_closing,
    }
}

/// A complete `<...>` tag found at `start`, with its name parsed.
#[derive(Clone, Copy, Debug)]
pub struct TagSpan<'a> {
    pub start: usize,
    /// One past the closing '>'.
    pub end: usize,
    pub info: TagInfo<'a>,
}

/// Parse the tag that starts at `s[i] == '<'`. `None` for a bare '<' (no name)
/// or a tag that never terminates.
pub fn tag_at(s: &[u8], i: usize) -> Option<TagSpan<'_>> {
    let j = find_tag_end(s, i)?;
    let info = parse_tag_info(&s[i..=j]);
    if info.name.is_empty() {
        return None;
    }
    Some(TagSpan {
        start: i,
        end: j + 1,
        info,
    })
}

/* ============================ Attribute scan ============================= */

/// Value of attribute `wanted` inside a raw start tag, unquoted.
/// `Some(b"")` for a present-but-empty attribute.
pub fn attr_value<'a>(tag: &'a [u8], wanted: &[u8]) -> Option<&'a [u8]> {
    // [name] ( '=' [value] )? ; value may be quoted or unquoted.
    let len = tag.len();
    if len < 2 {
        return None;
    }
    let mut i = 1usize;
    // skip the tag name itself
    while i < len && tag[i] != b'>' && !is_ws(tag[i]) && tag[i] != b'/' {
        i += 1;
    }

    while i < len && tag[i] != b'>' {
        while i < len && (is_ws(tag[i]) || tag[i] == b'/') {
            i += 1;
        }
        if i >= len || tag[i] == b'>' {
            break;
        }
        if !is_name_char(tag[i]) {
            i += 1;
            continue;
        }
        let name_start = i;
        while i < len && is_name_char(tag[i]) {
            i += 1;
        }
        let name = &tag[name_start..i];

        while i < len && is_ws(tag[i]) {
            i += 1;
        }

        let mut value: &[u8] = b"";
        if i < len && tag[i] == b'=' {
            i += 1;
            while i < len && is_ws(tag[i]) {
                i += 1;
            }
            if i < len && (tag[i] == b'"' || tag[i] == b'\'') {
                let q = tag[i];
                i += 1;
                let v_start = i;
                while i < len && tag[i] != q {
                    i += 1;
                }
                value = &tag[v_start..i];
                if i < len {
                    i += 1;
                }
            } else {
                let v_start = i;
                while i < len && !is_ws(tag[i]) && tag[i] != b'>' {
                    i += 1;
                }
                value = &tag[v_start..i];
            }
        }
        if name.eq_ignore_ascii_case(wanted) {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_end_skips_quoted_gt() {
        let s = br#"<a href="x>y">z</a>"#;
        assert_eq!(find_tag_end(s, 0), Some(13));
    }

    #[test]
    fn parses_end_and_self_closing() {
        let ti = parse_tag_info(b"</code>");
        assert_eq!(ti.name, b"code");
        assert!(ti.is_end);

        let ti = parse_tag_info(b"<br />");
        assert_eq!(ti.name, b"br");
        assert!(ti.self_closing);
    }

    #[test]
    fn bare_lt_is_not_a_tag() {
        assert!(tag_at(b"a < b > c", 2).is_none());
        assert!(tag_at(b"<b unterminated", 0).is_none());
    }

    #[test]
    fn reads_href_in_any_quoting() {
        assert_eq!(
            attr_value(br#"<a class="x" href="http://x">"#, b"href"),
            Some(&b"http://x"[..])
        );
        assert_eq!(attr_value(b"<a HREF='y'>", b"href"), Some(&b"y"[..]));
        assert_eq!(attr_value(b"<a href=z>", b"href"), Some(&b"z"[..]));
        assert_eq!(attr_value(b"<a title=\"t\">", b"href"), None);
    }

    #[test]
    fn inline_vocabulary() {
        assert!(is_inline(b"CODE"));
        assert!(is_inline(b"a"));
        assert!(!is_inline(b"div"));
        assert!(is_void(b"br"));
    }
}
