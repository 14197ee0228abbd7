// Tag allowlist and link cleanup. Runs before any text rewriting, on markup
// of unknown origin.

use memchr::{memchr, memmem};

use crate::markup::{attr_value, is_raw_text, is_void, matches_ignore_ascii_case, tag_at};

/// Tags that survive sanitizing. Synonyms and `p`/`br` are folded later.
const ALLOWED: &[&[u8]] = &[
    b"b", b"strong", b"i", b"em", b"u", b"s", b"strike", b"del", b"a", b"code", b"pre", b"p",
    b"br",
];

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Drop every tag outside the allowlist (keeping its text), every attribute
/// except `href` on `a`, comments, and the content of script-like elements.
/// A stray `<` becomes `&lt;`.
///
/// The output is always balanced:
/// - a close tag with no open counterpart is dropped;
/// - closing an outer tag first closes whatever is still open inside it;
/// - tags left open at the end of input are closed there.
pub fn sanitize(src: &str) -> String {
    let s = src.as_bytes();
    let n = s.len();
    let mut out = String::with_capacity(n);
    let mut open: Vec<OpenTag> = Vec::new();

    let mut i = 0usize;
    while i < n {
        let Some(off) = memchr(b'<', &s[i..]) else {
            out.push_str(&src[i..]);
            break;
        };
        let lt = i + off;
        out.push_str(&src[i..lt]);

        if s[lt..].starts_with(b"<!--") {
            i = memmem::find(&s[lt + 4..], b"-->")
                .map(|p| lt + 4 + p + 3)
                .unwrap_or(n);
            continue;
        }

        let Some(span) = tag_at(s, lt) else {
            out.push_str("&lt;");
            i = lt + 1;
            continue;
        };
        let info = span.info;
        let tag = &s[span.start..span.end];
        i = span.end;

        if !info.is_end && !info.self_closing && is_raw_text(info.name) {
            i = skip_raw_text(s, i, info.name);
            continue;
        }
        if !matches_ignore_ascii_case(info.name, ALLOWED) {
            continue;
        }

        let name = String::from_utf8_lossy(info.name).to_ascii_lowercase();
        if is_void(info.name) {
            out.push('<');
            out.push_str(&name);
            out.push('>');
            continue;
        }

        if info.is_end {
            if let Some(k) = open.iter().rposition(|t| t.name == name) {
                close_from(&mut out, &mut open, k);
            }
            continue;
        }

        // Links and paragraphs do not nest; a new one ends the previous.
        if NO_NESTING.contains(&name.as_str()) {
            if let Some(k) = open.iter().rposition(|t| t.name == name) {
                close_from(&mut out, &mut open, k);
            }
        }

        let kept = if name == "a" {
            match safe_href(tag) {
                Some(href) => {
                    out.push_str("<a href=\"");
                    out.push_str(&href.replace('"', "&quot;"));
                    out.push_str("\">");
                    true
                }
                None => false,
            }
        } else {
            out.push('<');
            out.push_str(&name);
            out.push('>');
            true
        };
        open.push(OpenTag { name, kept });
    }

    close_from(&mut out, &mut open, 0);
    out
}

const NO_NESTING: &[&str] = &["a", "p"];

/// An allowed element still open in the output. `kept` is false for an `a`
/// whose tag was dropped, so its close is dropped too.
struct OpenTag {
    name: String,
    kept: bool,
}

/// Close `open[k..]`, innermost first.
fn close_from(out: &mut String, open: &mut Vec<OpenTag>, k: usize) {
    for tag in open.drain(k..).rev() {
        if tag.kept {
            out.push_str("</");
            out.push_str(&tag.name);
            out.push('>');
        }
    }
}

fn safe_href(tag: &[u8]) -> Option<String> {
    let href = attr_value(tag, b"href")?;
    let href = String::from_utf8_lossy(href).trim().to_string();
    if href.is_empty() {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }
    Some(href)
}

/// Index just past the matching `</name>`, or the end of input.
fn skip_raw_text(s: &[u8], mut j: usize, name: &[u8]) -> usize {
    let n = s.len();
    while let Some(off) = memchr(b'<', &s[j..]) {
        let pos = j + off;
        if pos + 1 < n && s[pos + 1] == b'/' {
            if let Some(span) = tag_at(s, pos) {
                if span.info.name.eq_ignore_ascii_case(name) {
                    return span.end;
                }
                j = span.end;
                continue;
            }
        }
        j = pos + 1;
    }
    n
}

/* ============================== Links =================================== */

/// Remove links with blank text; flatten and trim the text of the rest.
pub fn tidy_links(src: &str) -> String {
    let s = src.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0usize;

    while let Some(off) = memmem::find(&s[i..], b"<a href=") {
        let start = i + off;
        let Some(span) = tag_at(s, start) else {
            break;
        };
        let Some(close_off) = memmem::find(&s[span.end..], b"</a>") else {
            break;
        };
        let close = span.end + close_off;

        out.push_str(&src[i..start]);
        let text = strip_tags(&src[span.end..close]);
        let text = text.trim();
        if !text.is_empty() {
            out.push_str(&src[span.start..span.end]);
            out.push_str(text);
            out.push_str("</a>");
        }
        i = close + 4;
    }
    out.push_str(&src[i..]);
    out
}

fn strip_tags(src: &str) -> String {
    let s = src.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0usize;
    while let Some(off) = memchr(b'<', &s[i..]) {
        let lt = i + off;
        out.push_str(&src[i..lt]);
        match tag_at(s, lt) {
            Some(span) => i = span.end,
            None => {
                out.push('<');
                i = lt + 1;
            }
        }
    }
    out.push_str(&src[i..]);
    out
}
