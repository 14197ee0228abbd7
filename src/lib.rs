// src/lib.rs
//
// msgsplit — split inline-HTML message bodies into chunks under a length
// ceiling, keeping every chunk's tags balanced.
//
// - normalize: raw HTML → canonical markup (b, i, u, s, a, code, pre, \n).
// - chunker:   canonical markup → chunks; cuts prefer closing tags and line
//              breaks, then links, sentences, clauses, then a hard cut.
// - marker:    hide small integers in text as zero-width code points.

pub mod chunker;
pub mod config;
pub mod markup;
pub mod marker;
pub mod normalize;

pub use chunker::{
    balance, select_cut, select_cut_after, split, split_chunks, Chunk, ChunkMetadata, Cut,
    CutReason, Nesting, Patch, SplitError, Splitter, DEFAULT_CEILING,
};
pub use config::{Config, ConfigError};
pub use marker::MarkerError;
pub use normalize::{normalize, normalize_bytes, Normalizer};
