use memchr::memmem;

/// Why a cut landed where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutReason {
    /// Right after a closing tag; the value is the rank (1 = `</a>` + newline,
    /// 7 = `</u>`).
    Closing(u8),
    /// Right after a newline (rank 8).
    Newline,
    /// Before the last unfinished `<a href=`.
    LinkStart,
    /// After the last ". ".
    Sentence,
    /// After the last ", ".
    Clause,
    /// No safe point; cut at the window end.
    Hard,
}

/// A chosen cut: byte offset into the window plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut {
    pub position: usize,
    pub reason: CutReason,
}

/// Structural boundaries, highest rank first. A cut goes right after
/// `pattern`, and only if `pattern` is followed by `follow` inside the window.
struct Boundary {
    pattern: &'static [u8],
    follow: &'static [u8],
    reason: CutReason,
}

const BOUNDARIES: &[Boundary] = &[
    Boundary { pattern: b"</a>", follow: b"\n", reason: CutReason::Closing(1) },
    Boundary { pattern: b"</b>", follow: b"", reason: CutReason::Closing(2) },
    Boundary { pattern: b"</code>", follow: b"", reason: CutReason::Closing(3) },
    Boundary { pattern: b"</i>", follow: b"", reason: CutReason::Closing(4) },
    Boundary { pattern: b"</pre>", follow: b"", reason: CutReason::Closing(5) },
    Boundary { pattern: b"</s>", follow: b"", reason: CutReason::Closing(6) },
    Boundary { pattern: b"</u>", follow: b"", reason: CutReason::Closing(7) },
    Boundary { pattern: b"\n", follow: b"", reason: CutReason::Newline },
];

const LINK_OPEN: &[u8] = b"<a href=";

/// Best place to end a chunk inside `window`.
///
/// A link that starts the window yields a cut at 0; the chunker uses
/// [`select_cut_after`] instead so it never stalls on one.
pub fn select_cut(window: &str) -> Cut {
    select_from(window, 0)
}

/// Like [`select_cut`], but ignores every candidate at or before `floor`.
///
/// The chunker passes the length of the tags it re-opened at the start of the
/// window, so a cut always consumes at least one byte of the document. The
/// hard cut (window end) is returned even when it is not past `floor`; callers
/// make sure the window is longer than that.
pub fn select_cut_after(window: &str, floor: usize) -> Cut {
    select_from(window, floor + 1)
}

fn select_from(window: &str, min: usize) -> Cut {
    let w = window.as_bytes();

    // Rightmost qualifying position wins, whatever its rank. On a tie the
    // higher rank is reported.
    let mut best: Option<Cut> = None;
    for boundary in BOUNDARIES {
        if let Some(position) = last_right_of(w, boundary.pattern, boundary.follow, min) {
            if best.map_or(true, |b| position > b.position) {
                best = Some(Cut {
                    position,
                    reason: boundary.reason,
                });
            }
        }
    }
    if let Some(cut) = best {
        return cut;
    }

    if let Some(position) = last_left_of(w, LINK_OPEN, min) {
        return Cut { position, reason: CutReason::LinkStart };
    }
    if let Some(position) = last_right_of(w, b". ", b"", min) {
        return Cut { position, reason: CutReason::Sentence };
    }
    if let Some(position) = last_right_of(w, b", ", b"", min) {
        return Cut { position, reason: CutReason::Clause };
    }

    Cut {
        position: w.len(),
        reason: CutReason::Hard,
    }
}

/* ========================= Position scanning ============================ */

/// Offset right after the last `pattern` that is followed by `follow`,
/// restricted to offsets of at least `min`.
fn last_right_of(text: &[u8], pattern: &[u8], follow: &[u8], min: usize) -> Option<usize> {
    memmem::rfind_iter(text, pattern)
        .map(|start| start + pattern.len())
        .take_while(|&pos| pos >= min)
        .find(|&pos| text[pos..].starts_with(follow))
}

/// Offset of the last `pattern` start, if it is at least `min`.
fn last_left_of(text: &[u8], pattern: &[u8], min: usize) -> Option<usize> {
    memmem::rfind(text, pattern).filter(|&pos| pos >= min)
}
