use chrono::Datelike;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, DueStatus, NoticeKind};
use crate::tui::{DatePicker, PickerPurpose};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Bookmark table
            Constraint::Length(6), // Selected bookmark details
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);
    render_details(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);

    if app.url_input_active {
        render_url_input(frame, app);
    }

    if let Some(picker) = &app.date_picker {
        render_date_picker(frame, picker);
    }

    if app.cell_edit.is_some() {
        render_cell_edit(frame, app);
    }

    if app.show_help {
        render_help(frame);
    }

    // Notices sit on top of everything else
    if app.notice.is_some() {
        render_notice(frame, app);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Bookmarker [Sort: {}] ", app.sort.label());
    let stats = format!(
        " {} Bookmarks | {} Overdue",
        app.rows.len(),
        app.overdue_count()
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(["ID", "URL", "Title", "Summary", "Stored Date", "Due Date"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|row| {
            let bookmark = &row.bookmark;
            let due_cell = match row.due_status {
                DueStatus::Pending => Cell::from(bookmark.due_date.clone()),
                DueStatus::Overdue => Cell::from(bookmark.due_date.clone())
                    .style(Style::default().fg(Color::Red)),
                DueStatus::Invalid => Cell::from("invalid")
                    .style(Style::default().fg(Color::Magenta)),
            };

            Row::new(vec![
                Cell::from(bookmark.id.to_string()),
                Cell::from(bookmark.url.clone()).style(Style::default().fg(Color::Blue)),
                Cell::from(bookmark.title.clone()),
                Cell::from(bookmark.summary.clone()).style(Style::default().fg(Color::Gray)),
                Cell::from(bookmark.stored_date.format("%Y-%m-%d %H:%M").to_string()),
                due_cell,
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Percentage(30),
        Constraint::Length(16),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !app.rows.is_empty() {
        state.select(Some(app.selected_index));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Bookmark ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let lines = match app.selected_row() {
        Some(row) => vec![
            Line::from(Span::styled(
                row.bookmark.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                row.bookmark.url.clone(),
                Style::default().fg(Color::Blue),
            )),
            Line::from(row.bookmark.summary.clone()),
        ],
        None => vec![Line::from("No bookmarks yet. Press 'a' to add one.")],
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.is_fetching {
        "Fetching page..."
    } else {
        "a:add  o:open  d:delete  u:due date  s:sort  e:edit  ?:help  q:quit"
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_url_input(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());

    let block = Block::default()
        .title(" Add bookmark - Enter URL ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let input_text = format!("> {}_", app.url_input);
    let paragraph = Paragraph::new(input_text).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_date_picker(frame: &mut Frame, picker: &DatePicker) {
    let area = centered_rect(40, 50, frame.area());

    let title = match &picker.purpose {
        PickerPurpose::NewBookmark { .. } => " Select Due Date ",
        PickerPurpose::UpdateDueDate { .. } => " Update Due Date ",
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let selected_day = picker.selected.day();
    let mut lines = vec![
        Line::from(Span::styled(
            picker.selected.format("%B %Y").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Mo Tu We Th Fr Sa Su",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    for week in picker.month_grid() {
        let spans: Vec<Span> = week
            .iter()
            .map(|day| match day {
                Some(d) if *d == selected_day => Span::styled(
                    format!("{d:>2} "),
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                ),
                Some(d) => Span::raw(format!("{d:>2} ")),
                None => Span::raw("   "),
            })
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!("Due: {}", picker.due_date())));
    lines.push(Line::from(Span::styled(
        "←/→ day  ↑/↓ week  PgUp/PgDn month  t today  Enter ok",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_cell_edit(frame: &mut Frame, app: &App) {
    let Some(edit) = &app.cell_edit else {
        return;
    };
    let area = centered_rect(70, 20, frame.area());

    let block = Block::default()
        .title(format!(
            " Edit {} (Tab: next column, not saved on reload) ",
            edit.column.label()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(format!("> {}_", edit.buffer))
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_notice(frame: &mut Frame, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };
    let area = centered_rect(50, 25, frame.area());

    let (title, color) = match notice.kind {
        NoticeKind::Success => (" Success ", Color::Green),
        NoticeKind::Error => (" Error ", Color::Red),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let text = format!("{}\n\nPress any key to continue", notice.message);
    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   < / >    Top / bottom",
        "",
        " Actions:",
        "   a        Add bookmark",
        "   o        Open in browser",
        "   d        Delete bookmark",
        "   u        Update due date",
        "   s        Toggle sort (due / stored)",
        "   r        Reload from database",
        "   e        Edit cell (display only)",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
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
