mod balance;
mod cut;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

use memchr::memrchr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::markup::tag_at;

pub use balance::{balance, Nesting, Patch};
pub use cut::{select_cut, select_cut_after, Cut, CutReason};

/// Default chunk ceiling, in chars. Leaves headroom under Telegram's 4096.
pub const DEFAULT_CEILING: usize = 4000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("chunk ceiling must be at least 1")]
    InvalidCeiling,
}

/// One output fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Text to send: `reopened + document[start_offset..end_offset] + closed`.
    pub text: String,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Byte offset in the document (start)
    pub start_offset: usize,
    /// Byte offset in the document (end, exclusive)
    pub end_offset: usize,
    /// Tags carried over from the previous chunk
    pub reopened: String,
    /// Tags appended to close what the cut left open
    pub closed: String,
    /// Rule that ended this chunk; `None` for the last one
    pub cut: Option<CutReason>,
}

/// Tag-aware splitter for one ceiling/nesting combination.
#[derive(Debug, Clone, Copy)]
pub struct Splitter {
    ceiling: usize,
    nesting: Nesting,
}

struct Step {
    cut: Cut,
    patch: Patch,
}

impl Splitter {
    pub fn new(ceiling: usize) -> Result<Self, SplitError> {
        if ceiling == 0 {
            return Err(SplitError::InvalidCeiling);
        }
        Ok(Self {
            ceiling,
            nesting: Nesting::default(),
        })
    }

    pub fn with_nesting(mut self, nesting: Nesting) -> Self {
        self.nesting = nesting;
        self
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn nesting(&self) -> Nesting {
        self.nesting
    }

    /// Chunk texts only.
    pub fn split(&self, document: &str) -> Vec<String> {
        self.split_chunks(document)
            .into_iter()
            .map(|c| c.text)
            .collect()
    }

    /// Split `document` into chunks of at most `ceiling` chars each.
    ///
    /// Each round takes the first `ceiling` chars of what is left (with any
    /// carried tags in front), picks a cut, closes whatever the cut leaves open
    /// and carries the matching opening tags into the next round.
    pub fn split_chunks(&self, document: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut offset = 0usize;
        let mut carry = String::new();

        while offset < document.len() {
            let rest = &document[offset..];
            // Only the first `ceiling` chars of the rest can land in this chunk.
            let head = &rest[..byte_offset(rest, self.ceiling)];
            let text: Cow<'_, str> = if carry.is_empty() {
                Cow::Borrowed(head)
            } else {
                Cow::Owned(format!("{carry}{head}"))
            };
            let floor = carry.len();

            if head.len() == rest.len() && shorter_than(&text, self.ceiling) {
                chunks.push(Chunk {
                    text: text.into_owned(),
                    metadata: ChunkMetadata {
                        start_offset: offset,
                        end_offset: document.len(),
                        reopened: std::mem::take(&mut carry),
                        closed: String::new(),
                        cut: None,
                    },
                });
                break;
            }

            let Step { cut, patch } = self.next_step(&text, floor, rest);
            let consumed = cut.position - floor;
            debug!(
                offset,
                cut = cut.position,
                reason = ?cut.reason,
                close = %patch.close,
                "chunk boundary"
            );

            let mut chunk_text = String::with_capacity(cut.position + patch.close.len());
            chunk_text.push_str(&text[..cut.position]);
            chunk_text.push_str(&patch.close);

            chunks.push(Chunk {
                text: chunk_text,
                metadata: ChunkMetadata {
                    start_offset: offset,
                    end_offset: offset + consumed,
                    reopened: std::mem::take(&mut carry),
                    closed: patch.close,
                    cut: Some(cut.reason),
                },
            });

            offset += consumed;
            carry = patch.reopen;
        }

        chunks
    }

    /// Choose the cut and patch for one round. `text` is the carried tags
    /// (`floor` bytes) followed by the head of `rest`, at least `ceiling`
    /// chars in all.
    fn next_step(&self, text: &str, floor: usize, rest: &str) -> Step {
        let is_tail = floor + rest.len() == text.len();
        let mut limit = self.ceiling;
        loop {
            let end = byte_offset(text, limit);
            if end <= floor {
                break;
            }
            let window = &text[..end];
            let cut = untorn(text, floor, rest, select_cut_after(window, floor));
            if is_tail && cut.position == text.len() {
                // Nothing left to carry into.
                return Step {
                    cut,
                    patch: Patch::default(),
                };
            }

            let patch = balance(window, cut.position, self.nesting);
            if patch.is_empty() {
                return Step { cut, patch };
            }
            let close_len = char_len(&patch.close);
            let used = char_len(&window[..cut.position]) + close_len;
            if used <= self.ceiling && char_len(&patch.reopen) + close_len < self.ceiling {
                return Step { cut, patch };
            }

            // Make room for the closing tags and look again.
            let next = self.ceiling.saturating_sub(close_len);
            if next >= limit {
                break;
            }
            limit = next;
        }

        // No balanced cut fits; send this one unpatched.
        let window = &text[..byte_offset(text, self.ceiling)];
        let cut = untorn(text, floor, rest, select_cut_after(window, floor));
        warn!(
            ceiling = self.ceiling,
            cut = cut.position,
            "open tags do not fit the ceiling, chunk left unbalanced"
        );
        Step {
            cut,
            patch: Patch::default(),
        }
    }
}

/// Move a cut that lands inside a tag back to the tag's `<`, as long as that
/// still leaves something of `rest` in the chunk. Tag ends are looked up in
/// `rest`, since the tag may run past the end of `text`.
fn untorn(text: &str, floor: usize, rest: &str, cut: Cut) -> Cut {
    let Some(lt) = memrchr(b'<', &text.as_bytes()[..cut.position]) else {
        return cut;
    };
    if lt <= floor {
        return cut;
    }
    match tag_at(rest.as_bytes(), lt - floor) {
        Some(span) if span.end + floor > cut.position => Cut {
            position: lt,
            ..cut
        },
        _ => cut,
    }
}

/// Split `document` into chunks of at most `ceiling` chars with balanced
/// inline tags, using the default nesting mode.
pub fn split(document: &str, ceiling: usize) -> Result<Vec<String>, SplitError> {
    Ok(Splitter::new(ceiling)?.split(document))
}

/// Like [`split`], keeping the per-chunk metadata.
pub fn split_chunks(document: &str, ceiling: usize) -> Result<Vec<Chunk>, SplitError> {
    Ok(Splitter::new(ceiling)?.split_chunks(document))
}

/* ============================ Char counting ============================= */

/// Byte offset of the `n`-th char, or `s.len()` if `s` is shorter.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// `char_len(s) < n` without walking past the n-th char.
fn shorter_than(s: &str, n: usize) -> bool {
    n > 0 && s.chars().nth(n - 1).is_none()
}
