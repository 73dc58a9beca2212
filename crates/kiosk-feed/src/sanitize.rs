//! Post bodies arrive as HTML. The display and printer fonts want plain text
//! with no astral-plane code points and no links, so every body passes
//! through [`sanitize`] before it is wrapped.
//!
//! Order matters: paragraph breaks become spaces first so words from
//! adjacent paragraphs don't fuse once the tags are gone, then tags and
//! references are resolved, then the character filter, then link removal.

use std::sync::LazyLock;

use regex::Regex;

/// Closing paragraph and line-break tags. Each gets a space appended.
static BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</p\s*>|<br\s*/?>").expect("break tag pattern is valid")
});

/// A link plus at most one space in front of it.
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ?http\S+").expect("link pattern is valid"));

/// Full pipeline: markup in, printable plain text out. Never fails;
/// malformed markup degrades to literal text.
#[must_use]
pub fn sanitize(markup: &str) -> String {
    let spaced = BREAK_TAG.replace_all(markup, "${0} ");
    let text = strip_tags(&spaced);
    let text = retain_bmp(&text);
    LINK.replace_all(&text, "").into_owned()
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Drop every tag and comment, keeping character data with references
/// decoded.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`, and
/// only if a closing `>` exists. Anything else is kept as text.
#[must_use]
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        push_decoded(&rest[..open], &mut out);
        let tail = &rest[open..];
        if let Some(len) = tag_len(tail) {
            rest = &tail[len..];
        } else {
            out.push('<');
            rest = &tail[1..];
        }
    }
    push_decoded(rest, &mut out);
    out
}

/// Byte length of the tag at the start of `tail`, if it is one.
fn tag_len(tail: &str) -> Option<usize> {
    let second = tail[1..].chars().next()?;
    if !(second.is_ascii_alphabetic() || matches!(second, '/' | '!' | '?')) {
        return None;
    }
    if let Some(body) = tail.strip_prefix("<!--") {
        return body.find("-->").map(|end| 4 + end + 3);
    }

    let mut quote = None;
    for (i, c) in tail.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i + 1),
            None => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Character references
// ---------------------------------------------------------------------------

/// Append `text` to `out` with every character reference decoded: the
/// full HTML5 named set (including the legacy forms without `;`, such as
/// `&amp` and `&copy`) plus decimal and hex numeric references. Anything
/// that is not a reference stays literal.
fn push_decoded(text: &str, out: &mut String) {
    out.push_str(&htmlize::unescape(text));
}

// ---------------------------------------------------------------------------
// Character filter
// ---------------------------------------------------------------------------

/// Keep only Basic Multilingual Plane characters. Emoji and other
/// astral-plane code points are dropped, not replaced.
#[must_use]
pub fn retain_bmp(text: &str) -> String {
    text.chars().filter(|&c| u32::from(c) < 0x1_0000).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paragraphs_keep_a_word_gap_and_links_vanish() {
        assert_eq!(
            sanitize("<p>Hello</p><p>world http://x.co</p>"),
            "Hello world "
        );
    }

    #[test]
    fn line_breaks_become_spaces() {
        assert_eq!(sanitize("one<br>two<br />three<BR/>"), "one two three ");
    }

    #[test]
    fn anchors_lose_their_links_but_not_their_neighbours() {
        let html = r#"<p>see <a href="https://example.com/a?b=1&amp;c=2" rel="nofollow">https://example.com/a</a> now</p>"#;
        assert_eq!(sanitize(html), "see now ");
    }

    #[test]
    fn references_are_decoded_once() {
        assert_eq!(strip_tags("fish &amp; chips"), "fish & chips");
        assert_eq!(strip_tags("&amp;lt;"), "&lt;");
        assert_eq!(strip_tags("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(strip_tags("it&#39;s"), "it's");
    }

    #[test]
    fn named_references_cover_the_html5_table() {
        assert_eq!(
            sanitize("<p>caf&eacute; &copy; 2024 &euro;5 &hearts;</p>"),
            "caf\u{e9} \u{a9} 2024 \u{20ac}5 \u{2665} "
        );
        assert_eq!(
            strip_tags("&Auml;&szlig;&rarr;&frac12;&CounterClockwiseContourIntegral;"),
            "\u{c4}\u{df}\u{2192}\u{bd}\u{2233}"
        );
    }

    #[test]
    fn legacy_references_decode_without_semicolon() {
        assert_eq!(strip_tags("fish &amp chips"), "fish & chips");
        assert_eq!(strip_tags("&copy 2024"), "\u{a9} 2024");
        assert_eq!(strip_tags("1 &lt 2"), "1 < 2");
    }

    #[test]
    fn unknown_references_stay_literal() {
        assert_eq!(strip_tags("a &bogus; b"), "a &bogus; b");
        assert_eq!(strip_tags("AT&T"), "AT&T");
        assert_eq!(strip_tags("a & b"), "a & b");
    }

    #[test]
    fn stray_angle_brackets_are_text() {
        assert_eq!(strip_tags("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
        assert_eq!(strip_tags("<3 you"), "<3 you");
    }

    #[test]
    fn unterminated_tag_is_text() {
        assert_eq!(strip_tags("hi <a href=\"x"), "hi <a href=\"x");
    }

    #[test]
    fn quoted_gt_does_not_close_a_tag() {
        assert_eq!(strip_tags(r#"<span title="a>b">text</span>"#), "text");
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(strip_tags("a<!-- <b>hidden</b> -->b"), "ab");
    }

    #[test]
    fn astral_plane_is_dropped() {
        assert_eq!(sanitize("<p>party \u{1f389} time</p>"), "party  time ");
        assert_eq!(retain_bmp("\u{ffff}\u{10000}"), "\u{ffff}");
    }

    #[test]
    fn empty_in_empty_out() {
        assert_eq!(sanitize(""), "");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn output_stays_in_the_bmp(s in any::<String>()) {
            prop_assert!(sanitize(&s).chars().all(|c| u32::from(c) < 0x1_0000));
        }

        #[test]
        fn output_carries_no_links(s in "[a-z<>/&;#: ]{0,80}(http[a-z:/.]{0,10})?[a-z ]{0,20}") {
            prop_assert!(!sanitize(&s).contains("http"));
        }

        #[test]
        fn plain_text_passes_through(s in "[a-gi-zA-Z0-9 .,!?]{0,100}") {
            prop_assert_eq!(sanitize(&s), s);
        }
    }
}
