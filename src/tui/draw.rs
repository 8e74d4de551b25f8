//! All drawing / rendering functions.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use super::app::App;

pub fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let title = " mawaqit ".to_string();
    let title_right = match (&app.api_addr, app.state.city.is_empty()) {
        (Some(addr), false) => format!(" {} | API: {addr} ", app.state.city),
        (Some(addr), true) => format!(" API: {addr} "),
        (None, false) => format!(" {} ", app.state.city),
        (None, true) => String::new(),
    };

    let outer = Block::default()
        .title(title)
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    // Render title-right manually in the top border
    let right_width = u16::try_from(title_right.chars().count()).unwrap_or(u16::MAX);
    let right_x = area
        .x
        .saturating_add(area.width)
        .saturating_sub(right_width + 1);
    if right_width > 0 && right_x > area.x + 1 {
        frame.render_widget(
            Paragraph::new(title_right).style(Style::default().fg(Color::Cyan)),
            Rect::new(right_x, area.y, right_width, 1),
        );
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Countdown
            Constraint::Min(10),   // Day table
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Controls bar
        ])
        .split(inner);

    draw_countdown(frame, app, chunks[0]);
    draw_table(frame, app, chunks[1]);

    let status_line =
        Paragraph::new(Line::from(build_status_line(app))).style(Style::default().fg(Color::White));
    frame.render_widget(status_line, chunks[2]);

    let controls_bar = Paragraph::new("r:refresh  q:quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(controls_bar, chunks[3]);
}

fn draw_countdown(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let lines = if app.state.loading {
        vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))]
    } else {
        vec![
            Line::from(Span::styled(
                app.state.next_prayer.as_str(),
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                app.state.timer.as_str(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
        ]
    };

    let countdown = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(countdown, area);
}

fn draw_table(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .state
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if app.state.highlight == Some(i) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(row.time.as_str()),
                Cell::from(row.name.as_str()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(10), Constraint::Min(16)])
        .column_spacing(3)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn build_status_line(app: &App) -> Vec<Span<'_>> {
    let mut spans = Vec::new();

    match app.state.last_refresh {
        Some(at) => spans.push(Span::styled(
            format!(" Updated {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::Green),
        )),
        None => spans.push(Span::styled(
            " Fetching prayer times...",
            Style::default().fg(Color::Yellow),
        )),
    }

    if !app.status.is_empty() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            app.status.as_str(),
            Style::default().fg(Color::Cyan),
        ));
    }

    spans
}
