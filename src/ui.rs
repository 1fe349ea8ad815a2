use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_task_list(frame, chunks[1], app);
    draw_status_bar(frame, chunks[2], app);

    if app.input.is_some() {
        draw_input_popup(frame, app);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let open = app.tasks.iter().filter(|t| !t.done).count();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "To-Do",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {open} open / {} total", app.tasks.len())),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_task_list(frame: &mut Frame, area: Rect, app: &App) {
    let visible_rows = visible_row_count(area);
    // Keep the selected row inside the window.
    let skip = app
        .selected
        .saturating_sub(visible_rows.saturating_sub(1));

    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible_rows)
        .map(|(i, task)| {
            let checkbox = if task.done { "[x] " } else { "[ ] " };
            let label_style = if task.done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            let mut line = Line::from(vec![
                Span::raw(checkbox),
                Span::styled(task.label.clone(), label_style),
            ]);
            if i == app.selected {
                line = line.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            ListItem::new(line)
        })
        .collect();

    let list =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Tasks"));
    frame.render_widget(list, area);

    if app.tasks.is_empty() {
        draw_empty_message(frame, area, "No tasks");
    }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let refresh_str = app
        .last_refresh
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut spans = vec![
        Span::styled(" Server: ", Style::default().fg(Color::Yellow)),
        Span::raw(app.server_url.clone()),
        Span::raw(" | "),
        Span::styled("Tasks: ", Style::default().fg(Color::Yellow)),
        Span::raw(app.tasks.len().to_string()),
        Span::raw(" | "),
        Span::styled("Refresh: ", Style::default().fg(Color::Yellow)),
        Span::raw(refresh_str),
    ];

    if let Some(err) = &app.error_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        ));
    }

    let hints = Line::from(Span::styled(
        " space toggle | a add | d delete | r reload | l log out | q quit",
        Style::default().fg(Color::DarkGray),
    ));

    let status = Paragraph::new(vec![Line::from(spans), hints])
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, area);
}

fn draw_input_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());
    let input = app.input.as_deref().unwrap_or_default();
    let popup = Paragraph::new(format!("{input}_")).block(
        Block::default()
            .borders(Borders::ALL)
            .title("New task (Enter to add, Esc to cancel)"),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn visible_row_count(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

fn draw_empty_message(frame: &mut Frame, area: Rect, message: &str) {
    let inner = centered_rect(60, 20, area);
    let text = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, inner);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
