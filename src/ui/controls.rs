//! Puzzle card, error line, question input, action menu, and start button

use super::conversation::wrap_text;
use super::keys::{ControlState, MenuItem, MAX_QUESTION_CHARS};
use crate::api::Puzzle;
use crate::state_machine::state::{Action, ErrorNotice};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub const APP_TITLE: &str = "Turtle Soup with AI";
const PLACEHOLDER: &str = "Read about a baffling event, ask any question you like, \
                           and work out what really happened!";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Rows the puzzle card needs at `width` columns, borders included
pub fn puzzle_card_height(puzzle: Option<&Puzzle>, width: u16) -> u16 {
    let inner = usize::from(width.saturating_sub(2));
    let body = match puzzle {
        Some(p) => wrap_text(&p.mystery, inner).len(),
        None => wrap_text(PLACEHOLDER, inner).len(),
    };
    u16::try_from(body + 2).unwrap_or(u16::MAX)
}

pub fn render_puzzle_card(frame: &mut Frame, area: Rect, puzzle: Option<&Puzzle>) {
    let (title, body) = match puzzle {
        Some(p) => (format!(" The Soup 《{}》 ", p.title), p.mystery.as_str()),
        None => (format!(" {APP_TITLE} "), PLACEHOLDER),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(
        Paragraph::new(body).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn action_label(action: Action) -> &'static str {
    match action {
        Action::NewGame => "start a new game",
        Action::Resume => "resume the saved game",
        Action::Question => "send the question",
        Action::RevealAnswer => "reveal the answer",
    }
}

pub fn error_text(notice: &ErrorNotice) -> String {
    format!(
        "Could not {} ({}): {}",
        action_label(notice.action),
        notice.kind.label(),
        notice.message
    )
}

pub fn render_error_line(frame: &mut Frame, area: Rect, notice: &ErrorNotice) {
    frame.render_widget(
        Paragraph::new(error_text(notice)).style(Style::default().fg(Color::Red)),
        area,
    );
}

pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    controls: &ControlState,
    pending: bool,
    tick: usize,
) {
    let count = controls.input.chars().count();
    let title = if pending {
        format!(" {} Waiting for the host ", spinner(tick))
    } else {
        format!(" Ask a question {count}/{MAX_QUESTION_CHARS} ")
    };
    let border = if pending { Color::DarkGray } else { Color::Cyan };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    let text = if controls.input.is_empty() && !pending {
        Line::from(Span::styled(
            "Type a question",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(controls.input.as_str())
    };
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Action menu popup anchored to the top right of `anchor`
pub fn render_menu(frame: &mut Frame, anchor: Rect, controls: &ControlState) {
    let width = 22.min(anchor.width);
    let height = u16::try_from(MenuItem::ALL.len() + 2)
        .unwrap_or(u16::MAX)
        .min(anchor.y);
    let area = Rect {
        x: anchor.right().saturating_sub(width),
        y: anchor.y.saturating_sub(height),
        width,
        height,
    };

    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .map(|item| ListItem::new(item.label()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Actions "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(controls.menu_cursor));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn render_start_button(frame: &mut Frame, area: Rect, pending: bool, tick: usize) {
    let label = if pending {
        format!("{} Serving the soup...", spinner(tick))
    } else {
        "Serve a random soup (Enter)".to_string()
    };
    let style = if pending {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    };
    frame.render_widget(
        Paragraph::new(label)
            .style(style)
            .centered()
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}
