use std::collections::HashMap;

use super::*;
use crate::markup::tag_at;

const STORY: &str = "<b>Breaking:</b> markets rallied today. Analysts said the move was expected, given the data.\n\
<a href=\"https://example.com/story\">Read the full story</a>\n\
In other news, <i>the weather <b>stays</b> mild</i> for the week. <code>let x = 1;</code> was trending, oddly.\n\
<pre>fn main() {}</pre>\n\
<s>old</s> <u>new</u> items. Done.";

fn long_story() -> String {
    vec![STORY; 6].join("\n")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Reassemble the document from the byte ranges the chunks cover.
fn content_only(document: &str, chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| &document[c.metadata.start_offset..c.metadata.end_offset])
        .collect()
}

/// Opening minus closing count per tag name.
fn tag_balance(s: &str) -> HashMap<String, i32> {
    let b = s.as_bytes();
    let mut counts = HashMap::new();
    let mut i = 0;
    while i < b.len() {
        if b[i] == b'<' {
            if let Some(span) = tag_at(b, i) {
                let name = String::from_utf8_lossy(span.info.name).to_ascii_lowercase();
                *counts.entry(name).or_insert(0) += if span.info.is_end { -1 } else { 1 };
                i = span.end;
                continue;
            }
        }
        i += 1;
    }
    counts.retain(|_, v| *v != 0);
    counts
}

#[test]
fn test_rejects_zero_ceiling() {
    assert_eq!(split("abc", 0), Err(SplitError::InvalidCeiling));
    assert!(Splitter::new(0).is_err());
}

#[test]
fn test_empty_document() {
    assert_eq!(split("", 10).unwrap(), Vec::<String>::new());
}

#[test]
fn test_short_document_is_untouched() {
    let doc = "<b>hi</b> there";
    assert_eq!(split(doc, 4000).unwrap(), vec![doc.to_string()]);
    assert_eq!(split(doc, doc.len() + 1).unwrap(), vec![doc.to_string()]);
}

#[test]
fn test_document_of_exactly_ceiling_length() {
    assert_eq!(split("abcde", 5).unwrap(), vec!["abcde".to_string()]);
}

#[test]
fn test_scenario_bold_boundary() {
    let doc = "<b>hello</b> world";
    assert_eq!(
        split(doc, 16).unwrap(),
        vec!["<b>hello</b>".to_string(), " world".to_string()]
    );

    // too tight for the whole bold span: it gets closed and reopened
    let chunks = split_chunks(doc, 10).unwrap();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["<b>hel</b>", "<b>lo</b>", " world"]);
    assert_eq!(chunks[1].metadata.reopened, "<b>");
    assert_eq!(chunks[1].metadata.cut, Some(CutReason::Closing(2)));
    assert_eq!(content_only(doc, &chunks), doc);
}

#[test]
fn test_scenario_unbroken_word_hard_cuts() {
    let doc = "x".repeat(50);
    let chunks = split_chunks(&doc, 10).unwrap();
    assert_eq!(chunks.len(), 5);
    for c in &chunks {
        assert_eq!(c.text, "x".repeat(10));
    }
    assert_eq!(chunks[0].metadata.cut, Some(CutReason::Hard));
    assert_eq!(chunks[0].metadata.end_offset, 10);
}

#[test]
fn test_scenario_link_pushed_forward() {
    let doc = r#"see <a href="http://x">click here</a> now"#;
    let chunks = split_chunks(doc, 30).unwrap();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "see ",
            r#"<a href="http://x">click h</a>"#,
            r#"<a href="http://x">ere</a> now"#,
        ]
    );
    assert_eq!(chunks[0].metadata.cut, Some(CutReason::LinkStart));
    assert_eq!(content_only(doc, &chunks), doc);
}

#[test]
fn test_link_at_window_start_still_progresses() {
    let doc = format!(r#"<a href="http://x">{}</a>"#, "y".repeat(80));
    let chunks = split_chunks(&doc, 40).unwrap();
    assert!(chunks.len() > 2);
    assert_eq!(content_only(&doc, &chunks), doc);
    for c in &chunks {
        assert!(char_len(&c.text) <= 40);
        assert!(tag_balance(&c.text).is_empty(), "unbalanced: {}", c.text);
    }
}

#[test]
fn test_length_bound_and_reconstruction_all_ceilings() {
    let doc = long_story();
    for nesting in [Nesting::Stack, Nesting::Innermost] {
        for ceiling in 1..=120 {
            let chunks = Splitter::new(ceiling)
                .unwrap()
                .with_nesting(nesting)
                .split_chunks(&doc);
            assert!(chunks.len() <= doc.len());
            for c in &chunks {
                assert!(
                    char_len(&c.text) <= ceiling,
                    "ceiling {ceiling}: {:?} is {} chars",
                    c.text,
                    char_len(&c.text)
                );
                let body = &doc[c.metadata.start_offset..c.metadata.end_offset];
                assert!(!body.is_empty());
                assert_eq!(
                    c.text,
                    format!("{}{}{}", c.metadata.reopened, body, c.metadata.closed)
                );
            }
            assert_eq!(content_only(&doc, &chunks), doc, "ceiling {ceiling}");
        }
    }
}

#[test]
fn test_stack_mode_balances_every_chunk() {
    let doc = long_story();
    for ceiling in [64, 80, 100, 150, 250, 500] {
        let chunks = split(&doc, ceiling).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(
                tag_balance(c).is_empty(),
                "ceiling {ceiling}: unbalanced chunk {c:?}"
            );
        }
    }
}

#[test]
fn test_patches_pair_up() {
    let doc = long_story();
    let chunks = split_chunks(&doc, 70).unwrap();
    for pair in chunks.windows(2) {
        let closed = &pair[0].metadata.closed;
        let reopened = &pair[1].metadata.reopened;
        assert_eq!(closed.is_empty(), reopened.is_empty());
        assert_eq!(tag_balance(&format!("{reopened}{closed}")), HashMap::new());
    }
    assert!(chunks.last().unwrap().metadata.closed.is_empty());
}

#[test]
fn test_nested_tags_stack_vs_innermost() {
    let doc = "<i>one <b>two</b> three four five six</i>";
    let stack = split(doc, 24).unwrap();
    assert!(stack.iter().all(|c| tag_balance(c).is_empty()), "{stack:?}");

    // the single-level balancer only sees the tag nearest the cut
    let innermost = Splitter::new(24)
        .unwrap()
        .with_nesting(Nesting::Innermost)
        .split(doc);
    assert_eq!(innermost[0], "<i>one <b>two</b>");
    assert!(!tag_balance(&innermost[0]).is_empty());
}

#[test]
fn test_prefers_paragraph_break_over_hard_cut() {
    let doc = "first paragraph here\nsecond paragraph goes on and on";
    let chunks = split_chunks(doc, 30).unwrap();
    assert_eq!(chunks[0].text, "first paragraph here\n");
    assert_eq!(chunks[0].metadata.cut, Some(CutReason::Newline));
}

#[test]
fn test_multibyte_text_counts_chars() {
    let doc = "привет мир. ещё немного текста, и всё. конец";
    for ceiling in 1..=20 {
        let chunks = split_chunks(doc, ceiling).unwrap();
        for c in &chunks {
            assert!(char_len(&c.text) <= ceiling);
        }
        assert_eq!(content_only(doc, &chunks), doc);
    }
    let chunks = split(doc, 15).unwrap();
    assert_eq!(chunks[0], "привет мир. ");
}

#[test]
fn test_tiny_ceiling_degrades_without_patches() {
    let doc = r#"<a href="http://example.com/long">link</a>"#;
    let chunks = split_chunks(doc, 5).unwrap();
    for c in &chunks {
        assert!(char_len(&c.text) <= 5);
        assert!(c.metadata.closed.is_empty());
    }
    assert_eq!(content_only(doc, &chunks), doc);
}

#[test]
fn test_hard_cut_never_tears_a_tag() {
    let doc = format!("{}<code>y</code>", "x".repeat(12));
    let chunks = split_chunks(&doc, 15).unwrap();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["xxxxxxxxxxxx", "<code>y</code>"]);
    assert_eq!(chunks[0].metadata.cut, Some(CutReason::Hard));
}

#[test]
fn test_tags_outside_vocabulary_are_not_carried() {
    let doc = "text <b>bold</b> and <span>more text here</span> end";
    for nesting in [Nesting::Stack, Nesting::Innermost] {
        let chunks = Splitter::new(30)
            .unwrap()
            .with_nesting(nesting)
            .split(doc);
        assert_eq!(
            chunks,
            vec!["text <b>bold</b>", " and <span>more text here", "</span> end"]
        );
    }
}

#[test]
fn test_long_document_with_carried_tags() {
    let doc = format!("<b>{}</b>", "word ".repeat(10_000));
    let chunks = split_chunks(&doc, 100).unwrap();
    assert_eq!(chunks.len(), 538);
    assert_eq!(content_only(&doc, &chunks), doc);
    for c in &chunks {
        assert!(char_len(&c.text) <= 100);
        assert!(tag_balance(&c.text).is_empty(), "unbalanced: {}", c.text);
    }
}
