use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use blitztype::session::{Session, SessionState};

use crate::{App, Screen};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Typing => render_typing(self, area, buf),
            Screen::Results => render_results(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn stat_line(session: &Session) -> Line<'static> {
    let value_style = bold().fg(Color::Cyan);
    let label_style = Style::default().add_modifier(Modifier::DIM);

    Line::from(vec![
        Span::styled("timer ", label_style),
        Span::styled(format!("{}s", session.seconds_remaining()), value_style),
        Span::raw("   "),
        Span::styled("wpm ", label_style),
        Span::styled(session.wpm().to_string(), value_style),
        Span::raw("   "),
        Span::styled("accuracy ", label_style),
        Span::styled(format!("{}%", session.accuracy()), value_style),
        Span::raw("   "),
        Span::styled("mistakes ", label_style),
        Span::styled(session.mistakes().to_string(), value_style),
    ])
}

fn phrase_spans(session: &Session) -> Vec<Span<'static>> {
    let green_bold = bold().fg(Color::Green);
    let red_bold = bold().fg(Color::Red);
    let cursor_style = dim_bold().add_modifier(Modifier::UNDERLINED);

    let phrase: Vec<char> = session.phrase().chars().collect();
    let typed: Vec<char> = session.input().chars().collect();

    let mut spans = Vec::with_capacity(phrase.len() + 1);

    for (idx, &expected) in phrase.iter().enumerate() {
        match typed.get(idx) {
            Some(&c) if c == expected => {
                spans.push(Span::styled(expected.to_string(), green_bold));
            }
            Some(&c) => {
                // make a mistyped space visible
                let shown = if c == ' ' { "·".to_owned() } else { c.to_string() };
                spans.push(Span::styled(shown, red_bold));
            }
            None => {
                let style = if idx == typed.len() {
                    cursor_style
                } else {
                    dim_bold()
                };
                spans.push(Span::styled(expected.to_string(), style));
            }
        }
    }
    spans
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.controller.session();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
    let prompt_width = session.phrase().width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(
                    ((area.height.saturating_sub(prompt_occupied_lines + 3)) as f64 / 2.0) as u16,
                ),
                Constraint::Length(prompt_occupied_lines),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(stat_line(session))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let phrase = Paragraph::new(Line::from(phrase_spans(session)))
        .alignment(if prompt_occupied_lines == 1 {
            // a single centered line reads best for short phrases
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    phrase.render(chunks[2], buf);

    let hint = if session.state() == SessionState::Idle {
        "start typing to begin — ctrl+r restart, esc quit"
    } else {
        "ctrl+r restart, esc quit"
    };
    Paragraph::new(Span::styled(hint, Style::default().add_modifier(Modifier::DIM)))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(2)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let headline = match &app.last_result {
        Some(result) => Line::from(vec![
            Span::styled(format!("{} wpm", result.wpm), bold().fg(Color::Cyan)),
            Span::raw("   "),
            Span::styled(format!("{}% accuracy", result.accuracy), bold().fg(Color::Green)),
            Span::raw("   "),
            Span::styled(format!("{} mistakes", result.mistakes), bold().fg(Color::Red)),
            Span::raw("   "),
            Span::styled(
                format!("{}s round", result.duration),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]),
        None => Line::from(Span::styled("round over", bold())),
    };
    Paragraph::new(headline)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if !app.history.is_empty() {
        Paragraph::new(Span::styled("previous rounds", dim_bold()))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let rows = app
            .history
            .iter()
            .rev()
            .take(chunks[2].height as usize)
            .map(|r| {
                Line::from(Span::styled(
                    format!(
                        "{:>4} wpm  {:>3}%  {:>3} mistakes  {:>3}s  {}",
                        r.wpm, r.accuracy, r.mistakes, r.duration, r.timestamp
                    ),
                    Style::default().add_modifier(Modifier::DIM),
                ))
            })
            .collect::<Vec<Line>>();
        Paragraph::new(rows)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        "(r)etry  esc quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}
