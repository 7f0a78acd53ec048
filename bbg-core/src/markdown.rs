//! Markdown to HTML conversion.

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Output of [`MarkdownProcessor::convert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub html: String,
    /// Text of the first top-level heading, whatever its level
    pub title_heading: Option<String>,
}

/// Span of the title heading within an event stream (inclusive)
struct TitleHeading {
    start: usize,
    end: usize,
    level: HeadingLevel,
    text: String,
}

/// Markdown processor with the extensions posts are written against
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { options }
    }

    /// Convert markdown to HTML.
    ///
    /// The first top-level heading is reported as the title heading. When
    /// `strip_title_heading` is set and that heading is level 1, it is left
    /// out of the HTML; lower levels always stay in the body.
    pub fn convert(&self, markdown: &str, strip_title_heading: bool) -> Converted {
        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();
        let heading = find_title_heading(&events);
        let title_heading = heading.as_ref().map(|h| h.text.clone());

        let events: Vec<Event> = match heading {
            Some(h) if strip_title_heading && h.level == HeadingLevel::H1 => events
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| *idx < h.start || *idx > h.end)
                .map(|(_, event)| event)
                .collect(),
            _ => events,
        };

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Converted {
            html: html_output,
            title_heading,
        }
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

// Only headings at the top of the block tree count; a `#` inside a list item
// or block quote is content.
fn find_title_heading(events: &[Event]) -> Option<TitleHeading> {
    let mut depth = 0usize;

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { level, .. }) if depth == 0 => {
                let mut text = String::new();
                for (end, inner) in events.iter().enumerate().skip(idx + 1) {
                    match inner {
                        Event::End(TagEnd::Heading(_)) => {
                            let text = text.trim().to_string();
                            if text.is_empty() {
                                break;
                            }
                            return Some(TitleHeading {
                                start: idx,
                                end,
                                level: *level,
                                text,
                            });
                        }
                        Event::Text(t) | Event::Code(t) => text.push_str(t),
                        Event::SoftBreak | Event::HardBreak => text.push(' '),
                        _ => {}
                    }
                }
                depth += 1;
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    None
}
