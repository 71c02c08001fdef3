//! Markdown rendering for response panes
//!
//! Responses come back as markdown; this flattens them into styled
//! ratatui lines. Code blocks keep their text verbatim so generated code
//! can be copied out of the terminal unmangled.

use pulldown_cmark::{CodeBlockKind, Event as MdEvent, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render markdown source into display lines
pub fn render_markdown(source: &str) -> Vec<Line<'static>> {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut style_stack: Vec<Style> = vec![Style::default()];
    let mut in_code_block = false;
    let mut list_depth: usize = 0;

    let flush =
        |current: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
            if !current.is_empty() {
                lines.push(Line::from(std::mem::take(current)));
            }
        };

    for event in parser {
        match event {
            MdEvent::Start(Tag::Heading { .. }) => {
                flush(&mut current, &mut lines);
                style_stack.push(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                );
            }
            MdEvent::End(TagEnd::Heading(..)) => {
                style_stack.pop();
                flush(&mut current, &mut lines);
                lines.push(Line::default());
            }
            MdEvent::Start(Tag::CodeBlock(kind)) => {
                flush(&mut current, &mut lines);
                in_code_block = true;
                let label = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => format!("[{lang}]"),
                    _ => "[code]".to_string(),
                };
                lines.push(Line::from(Span::styled(
                    label,
                    Style::default().fg(Color::DarkGray),
                )));
            }
            MdEvent::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::default());
            }
            MdEvent::Start(Tag::Emphasis) => {
                let top = *style_stack.last().unwrap_or(&Style::default());
                style_stack.push(top.add_modifier(Modifier::ITALIC));
            }
            MdEvent::End(TagEnd::Emphasis) => {
                style_stack.pop();
            }
            MdEvent::Start(Tag::Strong) => {
                let top = *style_stack.last().unwrap_or(&Style::default());
                style_stack.push(top.add_modifier(Modifier::BOLD));
            }
            MdEvent::End(TagEnd::Strong) => {
                style_stack.pop();
            }
            MdEvent::Start(Tag::List(_)) => {
                flush(&mut current, &mut lines);
                list_depth += 1;
            }
            MdEvent::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    lines.push(Line::default());
                }
            }
            MdEvent::Start(Tag::Item) => {
                flush(&mut current, &mut lines);
                current.push(Span::raw(format!(
                    "{}- ",
                    "  ".repeat(list_depth.saturating_sub(1))
                )));
            }
            MdEvent::End(TagEnd::Item) => {
                flush(&mut current, &mut lines);
            }
            MdEvent::Start(Tag::Paragraph) => {
                flush(&mut current, &mut lines);
            }
            MdEvent::End(TagEnd::Paragraph) => {
                flush(&mut current, &mut lines);
                if list_depth == 0 {
                    lines.push(Line::default());
                }
            }
            MdEvent::Text(text) => {
                if in_code_block {
                    let code_style = Style::default().fg(Color::Green);
                    for line in text.lines() {
                        lines.push(Line::from(Span::styled(line.to_string(), code_style)));
                    }
                } else {
                    let style = *style_stack.last().unwrap_or(&Style::default());
                    current.push(Span::styled(text.to_string(), style));
                }
            }
            MdEvent::Code(code) => {
                current.push(Span::styled(
                    code.to_string(),
                    Style::default().fg(Color::Yellow),
                ));
            }
            MdEvent::SoftBreak => {
                current.push(Span::raw(" "));
            }
            MdEvent::HardBreak => {
                flush(&mut current, &mut lines);
            }
            MdEvent::Rule => {
                flush(&mut current, &mut lines);
                lines.push(Line::from(Span::styled(
                    "────────",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }
    flush(&mut current, &mut lines);

    // Trim the trailing blank lines paragraph handling leaves behind
    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }
    lines
}
