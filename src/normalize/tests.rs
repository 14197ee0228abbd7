use super::*;
use crate::chunker::split;

#[test]
fn test_sanitize_keeps_only_inline_vocabulary() {
    let raw = r#"<div class="x"><strong style="c">Hi</strong> <span>there</span><img src="a.png"></div>"#;
    assert_eq!(sanitize(raw), "<strong>Hi</strong> there");
}

#[test]
fn test_sanitize_links() {
    assert_eq!(
        sanitize(r#"<a class="c" href="https://x.org/?q=1" target="_blank">go</a>"#),
        r#"<a href="https://x.org/?q=1">go</a>"#
    );
    // no href: tag dropped, text kept, its close tag dropped too
    assert_eq!(sanitize("<a name=\"top\">top</a> <b>x</b>"), "top <b>x</b>");
    assert_eq!(sanitize("<a href=\"javascript:alert(1)\">x</a>"), "x");
}

#[test]
fn test_sanitize_drops_scripts_and_comments() {
    assert_eq!(
        sanitize("a<script>var x = '<b>';</script>b<!-- note -->c<style>p{}</style>"),
        "abc"
    );
}

#[test]
fn test_sanitize_escapes_stray_lt() {
    assert_eq!(sanitize("1 < 2"), "1 &lt; 2");
}

#[test]
fn test_sanitize_closes_unclosed_tags() {
    assert_eq!(sanitize("<b>bold never closed"), "<b>bold never closed</b>");
    assert_eq!(sanitize("<p>one<p>two</p>"), "<p>one</p><p>two</p>");
}

#[test]
fn test_sanitize_drops_unmatched_close() {
    assert_eq!(sanitize("stray</i> close"), "stray close");
}

#[test]
fn test_sanitize_repairs_misnesting() {
    assert_eq!(sanitize("<b><i>misnested</b></i>"), "<b><i>misnested</i></b>");
    // closing a dropped anchor still closes what was opened inside it
    assert_eq!(sanitize("<a name=\"x\"><b>t</a> after"), "<b>t</b> after");
}

#[test]
fn test_sanitize_does_not_nest_links() {
    assert_eq!(
        sanitize(r#"<a href="u">one <a href="v">two</a>"#),
        r#"<a href="u">one </a><a href="v">two</a>"#
    );
}

#[test]
fn test_tidy_links() {
    assert_eq!(
        tidy_links(r#"a <a href="u">  </a>b <a href="v"> <b>bold</b> link </a>"#),
        r#"a b <a href="v">bold link</a>"#
    );
}

#[test]
fn test_normalize_message() {
    let raw = "<p>Hello <strong>world</strong></p>\n\n\n<p>Read<a href=\"https://x.org\">more</a>now</p>\n\t<p>  </p><br/>Bye  ";
    assert_eq!(
        normalize(raw),
        "Hello <b>world</b>\n\nRead <a href=\"https://x.org\">more</a> now\nBye"
    );
}

#[test]
fn test_normalize_trims_edges_and_stray_lines() {
    let raw = "\n\n   <em>x</em>      y\n \n•\nz   ";
    // the space before the dropped bullet line survives: edge trimming runs
    // before stray lines are removed
    assert_eq!(normalize(raw), "<i>x</i>\ny \nz");
}

#[test]
fn test_normalize_bytes_drops_invalid_utf8() {
    let raw = b"ok \xff\xfe<b>fine</b>";
    assert_eq!(normalize_bytes(raw), "ok <b>fine</b>");
}

#[test]
fn test_normalizer_without_pass() {
    let n = Normalizer::new().without("paragraph_spacing");
    assert!(!n.pass_names().contains(&"paragraph_spacing"));
    assert_eq!(n.pass_names().len(), PASSES.len() - 1);
    assert_eq!(n.run("a\n<b>x</b>"), "a\n<b>x</b>");
    assert_eq!(normalize("a\n<b>x</b>"), "a\n\n<b>x</b>");
    assert!(is_pass("sanitize"));
    assert!(!is_pass("nope"));
}

#[test]
fn test_normalized_output_chunks_cleanly() {
    let para = "<p><strong>Update:</strong> the <em>new build</em> is out. See <a href=\"https://example.com/notes\">the notes</a> for details, fixes and more.</p>";
    let raw = vec![para; 40].join("\n");
    let clean = normalize(&raw);
    let chunks = split(&clean, 300).unwrap();
    assert!(chunks.len() > 1);
    for c in &chunks {
        assert!(c.chars().count() <= 300);
        assert_eq!(c.matches("<b>").count(), c.matches("</b>").count());
        assert_eq!(c.matches("<i>").count(), c.matches("</i>").count());
        assert_eq!(c.matches("<a ").count(), c.matches("</a>").count());
    }
}

#[test]
fn test_unclosed_input_chunks_balanced() {
    let raw = format!("<b>bold never closed {}", "filler ".repeat(12));
    let clean = normalize(&raw);
    assert!(clean.ends_with("</b>"), "{clean:?}");
    let chunks = split(&clean, 40).unwrap();
    assert_eq!(chunks.len(), 4);
    for c in &chunks {
        assert_eq!(c.matches("<b>").count(), c.matches("</b>").count(), "{c:?}");
    }
}
