//! Dialog log view
//!
//! Rendered from scratch on every frame and always scrolled to the newest
//! entry.

use crate::api::{DialogEntry, Role};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Greedy wrap of `text` to `width` terminal columns.
///
/// Breaks at the last space that fits, or mid-word when a word is wider than
/// the line (CJK text has no spaces). Explicit newlines are kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for ch in paragraph.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            let mut wrapped = false;

            while line_width + ch_width > width && !line.is_empty() {
                let split = line.rfind(' ').filter(|&i| i > 0 && ch != ' ');
                let rest = match split {
                    Some(i) => {
                        let rest = line.split_off(i + 1);
                        line.truncate(i);
                        rest
                    }
                    None => String::new(),
                };
                lines.push(std::mem::replace(&mut line, rest));
                line_width = line.width();
                wrapped = true;
            }

            // No leading space on a continuation line
            if wrapped && ch == ' ' && line.is_empty() {
                continue;
            }
            line.push(ch);
            line_width += ch_width;
        }
        lines.push(line);
    }
    lines
}

/// Everything that is not the player is the host
fn speaker(role: Role) -> Span<'static> {
    if role.is_user() {
        Span::styled(
            "You",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "Host",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    }
}

/// Lines for the whole log at `width` columns, oldest first
pub fn conversation_lines(dialogs: &[DialogEntry], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, entry) in dialogs.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(speaker(entry.role)));
        lines.extend(
            wrap_text(&entry.content, width)
                .into_iter()
                .map(Line::from),
        );
    }
    lines
}

/// Offset that puts the last line at the bottom of the viewport
pub fn scroll_offset(total_lines: usize, viewport_height: usize) -> usize {
    total_lines.saturating_sub(viewport_height)
}

pub fn render(frame: &mut Frame, area: Rect, dialogs: &[DialogEntry]) {
    let block = Block::default().borders(Borders::ALL).title(" Conversation ");
    let inner = block.inner(area);

    let lines = conversation_lines(dialogs, usize::from(inner.width));
    let offset = scroll_offset(lines.len(), usize::from(inner.height));
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);

    frame.render_widget(Paragraph::new(lines).block(block).scroll((offset, 0)), area);
}
