// Text rewrites applied after sanitizing. Each pass is a pure `&str -> String`.

use once_cell::sync::Lazy;
use regex::Regex;

/* ========================== Literal replacement ========================= */

/// Replace every occurrence of the table's patterns, scanning left to right.
/// At a given position the first matching entry wins; replaced text is never
/// rescanned.
pub(crate) fn replace_ordered(src: &str, table: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    'scan: while let Some(c) = rest.chars().next() {
        for &(from, to) in table {
            if let Some(after) = rest.strip_prefix(from) {
                out.push_str(to);
                rest = after;
                continue 'scan;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

const GLYPHS: &[(&str, &str)] = &[
    ("\u{2800}", " "),
    ("\u{3000}", " "),
    ("\u{2007}", " "),
    ("\u{202F}", " "),
    ("\u{200C}", " "),
    ("\u{00A0}\u{034F}", " "),
    ("\u{00A0}", " "),
    ("\u{034F}", " "),
    ("\t", ""),
    ("\r", ""),
    ("<br>", "\n"),
    ("<br />", "\n"),
    ("<br/>", "\n"),
    ("<p>", "\n"),
    ("</p>", "\n"),
    ("<strong>", "<b>"),
    ("</strong>", "</b>"),
    ("<em>", "<i>"),
    ("</em>", "</i>"),
    ("<strike>", "<s>"),
    ("</strike>", "</s>"),
    ("<del>", "<s>"),
    ("</del>", "</s>"),
];

/// Odd spaces to plain spaces, line breaks to `\n`, tag synonyms to the short
/// form.
pub fn replace_glyphs(src: &str) -> String {
    replace_ordered(src, GLYPHS)
}

pub fn trim_line_edges(src: &str) -> String {
    replace_ordered(src, &[("\n ", " "), (" \n", "\n")])
}

/// Blank line before a link or bold span that starts a line, and after one
/// that ends a line.
pub fn paragraph_spacing(src: &str) -> String {
    replace_ordered(
        src,
        &[
            ("\n<a href", "\n\n<a href"),
            ("</a>\n", "</a>\n\n"),
            ("\n<b", "\n\n<b"),
            ("</b>\n", "</b>\n\n"),
        ],
    )
}

/* ============================ Regex rewrites ============================ */

// `\s` is spelled out: ASCII whitespace only, no Unicode classes.
static WIDE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {3,}").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\n[\t\n\f\r ]*){2,}").expect("valid regex"));
static STRAY_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n.\n").expect("valid regex"));
static GLUED_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\t\n\f\r ])(<a href)").expect("valid regex"));
static LINK_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</a>([^.,;!?:\t\n\f\r ])").expect("valid regex"));
static INDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n +").expect("valid regex"));

/// Runs of three or more spaces were layout; treat them as a line break.
pub fn collapse_wide_spaces(src: &str) -> String {
    WIDE_SPACES.replace_all(src, "\n").into_owned()
}

/// Any run of two or more line breaks (with blanks between) becomes one.
pub fn collapse_blank_lines(src: &str) -> String {
    let mut text = src.to_string();
    loop {
        let next = BLANK_LINES.replace_all(&text, "\n").into_owned();
        if next == text {
            return text;
        }
        text = next;
    }
}

/// Lines holding a single char are leftovers of bullets and separators.
pub fn drop_stray_chars(src: &str) -> String {
    STRAY_CHAR.replace_all(src, "\n").into_owned()
}

pub fn space_before_links(src: &str) -> String {
    GLUED_LINK.replace_all(src, "${1} ${2}").into_owned()
}

pub fn space_after_links(src: &str) -> String {
    LINK_TAIL.replace_all(src, "</a> ${1}").into_owned()
}

pub fn strip_indent(src: &str) -> String {
    INDENT.replace_all(src, "\n").into_owned()
}

pub fn trim_edges(src: &str) -> String {
    src.trim_start_matches('\n')
        .trim_end_matches('\n')
        .trim_start_matches(' ')
        .trim_end_matches(' ')
        .to_string()
}
