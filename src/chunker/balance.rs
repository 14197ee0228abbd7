use memchr::{memchr, memrchr};
use serde::Deserialize;

use crate::markup::{find_tag_end, is_inline, parse_tag_info, tag_at};

/// How many open tags the balancer carries across a cut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Nesting {
    /// Only the nearest unclosed tag before the cut.
    Innermost,
    /// Every tag still open at the cut, outermost first.
    #[default]
    Stack,
}

/// Tags to append to the finished chunk and to prepend to the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub close: String,
    pub reopen: String,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.close.is_empty() && self.reopen.is_empty()
    }
}

/// Work out which inline tags are open at `cut` inside `window`. Tags outside
/// the inline vocabulary are never carried.
///
/// Never fails: anything it cannot parse with confidence gives an empty patch.
pub fn balance(window: &str, cut: usize, nesting: Nesting) -> Patch {
    let cut = cut.min(window.len());
    match nesting {
        Nesting::Innermost => balance_innermost(window, cut),
        Nesting::Stack => balance_stack(window, cut),
    }
}

/* ============================== Innermost =============================== */

fn balance_innermost(window: &str, cut: usize) -> Patch {
    let w = window.as_bytes();
    let Some(lt) = memrchr(b'<', &w[..cut]) else {
        return Patch::default();
    };
    if w.get(lt + 1) == Some(&b'/') {
        return Patch::default();
    }
    // The tag has to be complete before the cut, or the chunk would carry
    // half of it anyway.
    let Some(gt) = find_tag_end(&w[..cut], lt) else {
        return Patch::default();
    };
    let info = parse_tag_info(&w[lt..=gt]);
    if info.self_closing || !is_inline(info.name) {
        return Patch::default();
    }
    Patch {
        close: close_tag(info.name),
        reopen: window[lt..=gt].to_string(),
    }
}

/* ================================ Stack ================================= */

struct OpenTag<'a> {
    name: &'a [u8],
    literal: &'a str,
}

fn balance_stack(window: &str, cut: usize) -> Patch {
    let w = &window.as_bytes()[..cut];
    let mut open: Vec<OpenTag<'_>> = Vec::new();

    let mut i = 0usize;
    while let Some(off) = memchr(b'<', &w[i..]) {
        let lt = i + off;
        let Some(span) = tag_at(w, lt) else {
            i = lt + 1;
            continue;
        };
        let info = span.info;
        if info.is_end {
            // Close the most recent matching tag; anything opened inside it
            // and never closed goes with it.
            if let Some(k) = open
                .iter()
                .rposition(|t| t.name.eq_ignore_ascii_case(info.name))
            {
                open.truncate(k);
            }
        } else if !info.self_closing && is_inline(info.name) {
            open.push(OpenTag {
                name: info.name,
                literal: &window[span.start..span.end],
            });
        }
        i = span.end;
    }

    let mut patch = Patch::default();
    for tag in open.iter().rev() {
        patch.close.push_str(&close_tag(tag.name));
    }
    for tag in &open {
        patch.reopen.push_str(tag.literal);
    }
    patch
}

fn close_tag(name: &[u8]) -> String {
    format!("</{}>", String::from_utf8_lossy(name))
}
