//! Text layout: greedy word wrap and line stacking.
//!
//! Layout never touches a device. Widths come from a [`Measure`] oracle and
//! line images from a [`GlyphRenderer`], so the same code lays out a post
//! for a pixel display, a terminal grid or a receipt printer column.
//!
//! ```text
//!   wrap("hello there world", measure, 11)      compose(lines, font, pitch)
//!   ┌───────────┐                               top 0     ┌─────────────┐
//!   │hello there│                               top pitch │hello there  │
//!   │world      │                                         │world        │
//!   └───────────┘                                         └─────────────┘
//! ```

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Width oracle. Units are whatever the target surface counts in: pixels,
/// terminal columns, printer characters.
pub trait Measure {
    fn measure(&self, text: &str) -> u32;
}

impl<F: Fn(&str) -> u32> Measure for F {
    #[inline]
    fn measure(&self, text: &str) -> u32 {
        self(text)
    }
}

/// A rendered line of text.
pub trait GlyphSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// A font: measures text and renders one line of it.
pub trait GlyphRenderer: Measure {
    type Surface: GlyphSurface;

    /// Render `text` as a single line with a transparent background.
    fn render(&self, text: &str) -> Self::Surface;

    /// Vertical distance between consecutive line tops.
    fn line_height(&self) -> u32;
}

// ---------------------------------------------------------------------------
// Wrap
// ---------------------------------------------------------------------------

/// Greedy word wrap.
///
/// Tabs become four spaces and `\n` splits paragraphs, each wrapped on its
/// own. With `max_width` unset or zero the paragraphs come back as-is. A
/// word wider than `max_width` is never split; it gets a line to itself and
/// overflows.
#[must_use]
pub fn wrap(text: &str, measure: &impl Measure, max_width: Option<u32>) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let text = text.replace('\t', "    ");
    let paragraphs = text.split('\n');

    let Some(width) = max_width.filter(|&w| w > 0) else {
        return paragraphs.map(str::to_owned).collect();
    };

    let mut lines = Vec::new();
    for paragraph in paragraphs {
        wrap_paragraph(paragraph, measure, width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, measure: &impl Measure, width: u32, out: &mut Vec<String>) {
    let trimmed = paragraph.trim_end();
    if trimmed.is_empty() {
        out.push(paragraph.to_owned());
        return;
    }

    // The trailing space is a sentinel: every word, the last included,
    // is followed by a space, so the scan below always finds one.
    let mut line = format!("{trimmed} ");
    let indent = line.len() - line.trim_start().len();
    let mut start = space_from(&line, indent);

    while start + 1 < line.len() {
        let next = space_from(&line, start + 1);
        if measure.measure(&line[..next]) <= width {
            start = next;
        } else {
            out.push(line[..start].to_owned());
            line.drain(..=start);
            start = space_from(&line, 0);
        }
    }

    line.pop();
    if !line.is_empty() {
        out.push(line);
    }
}

/// Byte index of the first space at or after `from`. Falls back to the
/// sentinel at the end of the line.
fn space_from(line: &str, from: usize) -> usize {
    line[from..]
        .find(' ')
        .map_or(line.len().saturating_sub(1), |i| from + i)
}

// ---------------------------------------------------------------------------
// Compose
// ---------------------------------------------------------------------------

/// How tall a composed block may grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightPolicy {
    /// Keep every line.
    #[default]
    Unbounded,
    /// Keep lines while they fit entirely within this many units; the
    /// first line that would cross the limit and everything after it are
    /// dropped.
    Clip(u32),
}

/// One rendered line and where it sits inside its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine<S> {
    pub text: String,
    /// Offset of this line's top edge from the block's top edge.
    pub top: u32,
    pub surface: S,
}

/// A stack of rendered lines, left aligned, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedBlock<S> {
    lines: Vec<PlacedLine<S>>,
    width: u32,
    height: u32,
}

impl<S> WrappedBlock<S> {
    #[must_use]
    pub fn lines(&self) -> &[PlacedLine<S>] {
        &self.lines
    }

    /// Width of the widest line.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }
}

impl<S> Default for WrappedBlock<S> {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            width: 0,
            height: 0,
        }
    }
}

/// Render each line and stack them `line_pitch` apart.
///
/// Block height is `(n - 1) * line_pitch` plus the last line's own height.
pub fn compose<R: GlyphRenderer>(
    lines: &[String],
    renderer: &R,
    line_pitch: u32,
    policy: HeightPolicy,
) -> WrappedBlock<R::Surface> {
    let mut block = WrappedBlock::default();
    let mut top = 0u32;

    for text in lines {
        let surface = renderer.render(text);
        let bottom = top.saturating_add(surface.height());
        if matches!(policy, HeightPolicy::Clip(limit) if bottom > limit) {
            break;
        }
        block.width = block.width.max(surface.width());
        block.height = bottom;
        block.lines.push(PlacedLine {
            text: text.clone(),
            top,
            surface,
        });
        top = top.saturating_add(line_pitch);
    }
    block
}

/// Wrap then compose with the renderer's own line height as the pitch.
pub fn layout<R: GlyphRenderer>(
    text: &str,
    renderer: &R,
    max_width: Option<u32>,
    policy: HeightPolicy,
) -> WrappedBlock<R::Surface> {
    let lines = wrap(text, renderer, max_width);
    compose(&lines, renderer, renderer.line_height(), policy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use unicode_width::UnicodeWidthStr;

    fn columns(s: &str) -> u32 {
        u32::try_from(s.width()).unwrap_or(u32::MAX)
    }

    /// One paragraph: words of ASCII, accented and double-width letters
    /// separated by runs of spaces, tabs and ideographic spaces, with
    /// optional leading indentation.
    fn paragraph() -> impl Strategy<Value = String> {
        "[ a-z\t\u{e9}\u{fc}\u{4e00}-\u{4e09}\u{3000}]{1,80}"
    }

    fn text() -> impl Strategy<Value = String> {
        "[ a-z\t\n\u{e9}\u{fc}\u{4e00}-\u{4e09}\u{3000}]{1,160}"
    }

    proptest! {
        // A line may be wider than the budget only if it is a single word.
        // Leading indentation belongs to the first word of a paragraph, and
        // a whitespace-only paragraph is passed through untouched, so both
        // are checked after trimming leading whitespace.
        #[test]
        fn lines_fit_unless_unsplittable(text in text(), width in 1u32..40) {
            for line in wrap(&text, &columns, Some(width)) {
                prop_assert!(
                    columns(&line) <= width || !line.trim_start().contains(' '),
                    "{line:?} wider than {width}"
                );
            }
        }

        #[test]
        fn paragraphs_wrap_independently(text in text(), width in 1u32..40) {
            let expected: Vec<String> = text
                .split('\n')
                .flat_map(|p| {
                    if p.is_empty() {
                        vec![String::new()]
                    } else {
                        wrap(p, &columns, Some(width))
                    }
                })
                .collect();
            prop_assert_eq!(wrap(&text, &columns, Some(width)), expected);
        }

        // Each break consumes exactly one space, so joining with single
        // spaces gives back the paragraph minus trailing whitespace.
        #[test]
        fn joining_lines_restores_the_paragraph(p in paragraph(), width in 1u32..40) {
            let expanded = p.replace('\t', "    ");
            let expected = if expanded.trim_end().is_empty() {
                expanded.as_str()
            } else {
                expanded.trim_end()
            };
            prop_assert_eq!(wrap(&p, &columns, Some(width)).join(" "), expected);
        }

        #[test]
        fn rewrapping_is_stable(p in paragraph(), width in 1u32..40) {
            let once = wrap(&p, &columns, Some(width));
            let twice = wrap(&once.join(" "), &columns, Some(width));
            prop_assert_eq!(once, twice);
        }
    }
}
