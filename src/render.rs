//! Citation-aware answer rendering.
//!
//! Answers are markdown strings that may contain bracketed ordinal citation
//! markers such as `[2]`. Rendering runs in two decoupled passes: first the
//! markers are lifted into structural segments (the shared scan lives in
//! [`crate::citations`]), then standard markdown transformation runs over the
//! remaining text. Lifting first guarantees a marker can never be swallowed
//! by emphasis or link syntax, and the digits inside a marker are never
//! reinterpreted as markdown.
//!
//! Answer text is server-generated and treated as a trusted boundary; no
//! sanitization pass is applied before display. Embedded math notation is
//! passed through verbatim.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

pub use crate::citations::{Segment, lift_citations};

/// The style applied to citation marker spans.
pub fn citation_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

/// Renders an answer into styled terminal text.
///
/// Text segments go through the markdown transformer; citation segments
/// become distinct styled spans carrying the literal marker text. Segments
/// are stitched so that a citation lands inline on the current line. The
/// markdown transformer trims each segment it is given, so boundary spaces
/// and tabs are split off beforehand and re-attached as raw spans to keep
/// the spacing around markers intact.
pub fn render_answer(answer: &str) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Line<'static> = Line::default();

    for segment in lift_citations(answer) {
        match segment {
            Segment::Citation { literal, .. } => {
                current.spans.push(Span::styled(literal, citation_style()));
            }
            Segment::Text(text) => {
                let after_leading = text.trim_start_matches([' ', '\t']);
                let leading = &text[..text.len() - after_leading.len()];
                let core = after_leading.trim_end_matches([' ', '\t']);
                let trailing = &after_leading[core.len()..];

                if !leading.is_empty() && !current.spans.is_empty() {
                    current.spans.push(Span::raw(leading.to_string()));
                }

                if !core.is_empty() {
                    let rendered = tui_markdown::from_str(core);
                    let mut rendered_lines = rendered.lines.into_iter();
                    if let Some(first) = rendered_lines.next() {
                        for span in first.spans {
                            current.spans.push(owned_span(span));
                        }
                    }
                    for line in rendered_lines {
                        lines.push(std::mem::take(&mut current));
                        current = owned_line(line);
                    }
                }

                if !trailing.is_empty() {
                    current.spans.push(Span::raw(trailing.to_string()));
                }
            }
        }
    }

    if !current.spans.is_empty() {
        lines.push(current);
    }

    Text::from(lines)
}

fn owned_span(span: Span<'_>) -> Span<'static> {
    Span::styled(span.content.into_owned(), span.style)
}

fn owned_line(line: Line<'_>) -> Line<'static> {
    let style = line.style;
    let alignment = line.alignment;
    let mut out = Line::from(line.spans.into_iter().map(owned_span).collect::<Vec<_>>());
    out.style = style;
    out.alignment = alignment;
    out
}
