use std::io;
use std::path::Path;

use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use crate::app::{App, NoticeKind};
use crate::present::{self, due_date_label};
use crate::task::{Task, TaskPatch};
use crate::theme::Palette;

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        let today = Local::now().date_naive();
        terminal.draw(|f| draw(f, app, today))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('a') => add_flow(app),
                KeyCode::Char('e') => edit_flow(app, today),
                KeyCode::Char('d') => {
                    if let Some(id) = selected_id(app, today) {
                        app.delete_task(&id, || confirm("Delete this task?"));
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(id) = selected_id(app, today) {
                        app.toggle_task(&id);
                    }
                }
                KeyCode::Char('/') => {
                    if let Some(term) = prompt("Search (empty to clear)") {
                        app.search = term;
                        app.selected = 0;
                    }
                }
                KeyCode::Char('s') => {
                    app.status_filter = app.status_filter.next();
                    app.selected = 0;
                }
                KeyCode::Char('c') => {
                    if let Some(input) = prompt("Filter by category (empty for all)") {
                        app.category_filter =
                            (!input.is_empty() && input != "all").then_some(input);
                        app.selected = 0;
                    }
                }
                KeyCode::Char('t') => app.toggle_theme(),
                KeyCode::Char('x') => app.export_tasks(Path::new("."), today),
                KeyCode::Char('i') => {
                    if let Some(path) = prompt("Import file path") {
                        if !path.is_empty() {
                            app.import_tasks(Path::new(&path));
                        }
                    }
                }
                KeyCode::Char('X') => {
                    app.clear_all(|| confirm("Delete ALL tasks? This cannot be undone."));
                }
                KeyCode::Up => app.select_previous(),
                KeyCode::Down => {
                    let len = app.visible(today).len();
                    app.select_next(len);
                }
                _ => {}
            }
            let len = app.visible(today).len();
            app.clamp_selection(len);
        }
    }
}

fn draw(f: &mut Frame, app: &App, today: NaiveDate) {
    let palette = app.theme.palette();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(f.area());

    draw_header(f, app, palette, chunks[0]);
    draw_tasks(f, app, palette, today, chunks[1]);
    draw_footer(f, app, palette, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, palette: Palette, area: Rect) {
    let stats = present::stats(app.store.snapshot());
    let mut spans = vec![
        Span::styled(
            format!("Total: {}", stats.total),
            Style::default().fg(palette.text),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Completed: {}", stats.completed),
            Style::default().fg(palette.done),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Pending: {}", stats.pending),
            Style::default().fg(palette.warning),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("status: {}", app.status_filter.label()),
            Style::default().fg(palette.accent),
        ),
        Span::styled(
            format!(
                "  category: {}",
                app.category_filter.as_deref().unwrap_or("all")
            ),
            Style::default().fg(palette.accent),
        ),
    ];
    if !app.search.is_empty() {
        spans.push(Span::styled(
            format!("  search: \"{}\"", app.search),
            Style::default().fg(palette.accent),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(format!("taskman ({})", app.theme.as_str()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent)),
    );
    f.render_widget(header, area);
}

fn draw_tasks(f: &mut Frame, app: &App, palette: Palette, today: NaiveDate, area: Rect) {
    let visible = app.visible(today);
    let block = Block::default()
        .title(format!("Tasks ({})", visible.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted));

    if visible.is_empty() {
        let empty = Paragraph::new("No tasks found. Press 'a' to add one.")
            .style(Style::default().fg(palette.muted))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| ListItem::new(task_line(task, today, palette)))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn task_line<'a>(task: &'a Task, today: NaiveDate, palette: Palette) -> Line<'a> {
    let mut spans = vec![Span::raw(if task.completed { "[x] " } else { "[ ] " })];

    let title_style = if task.completed {
        Style::default()
            .fg(palette.muted)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(palette.text)
    };
    spans.push(Span::styled(&task.title, title_style));

    if !task.description.is_empty() {
        spans.push(Span::styled(
            format!(" - {}", task.description),
            Style::default().fg(palette.muted),
        ));
    }
    if let Some(category) = &task.category {
        spans.push(Span::styled(
            format!(" #{}", present::capitalize_first(category)),
            Style::default().fg(palette.accent),
        ));
    }
    if let Some(due) = task.due_date {
        let style = if !task.completed && due < today {
            Style::default().fg(palette.danger)
        } else if !task.completed && present::is_due_soon(due, today) {
            Style::default().fg(palette.warning)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(
            format!(" ({})", due_date_label(due, today)),
            style,
        ));
    }

    Line::from(spans)
}

fn draw_footer(f: &mut Frame, app: &App, palette: Palette, area: Rect) {
    let help = "a add  e edit  d delete  space done  / search  s status  c category  \
                t theme  x export  i import  X clear  q quit";
    let mut lines = vec![Line::from(Span::styled(
        help,
        Style::default().fg(palette.muted),
    ))];
    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Success => palette.done,
            NoticeKind::Error => palette.danger,
            NoticeKind::Info => palette.accent,
        };
        lines.push(Line::from(Span::styled(
            notice.message.as_str(),
            Style::default().fg(color),
        )));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn selected_id(app: &App, today: NaiveDate) -> Option<String> {
    app.visible(today).get(app.selected).map(|t| t.id.clone())
}

fn add_flow(app: &mut App) {
    let Some(title) = prompt("Task title") else {
        return;
    };
    let Some(description) = prompt("Description (optional)") else {
        return;
    };
    let Some(due_raw) = prompt("Due date YYYY-MM-DD (optional)") else {
        return;
    };
    let due_date = if due_raw.is_empty() {
        None
    } else {
        match NaiveDate::parse_from_str(&due_raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                app.notify(NoticeKind::Error, "Due date must be YYYY-MM-DD");
                return;
            }
        }
    };
    let Some(category) = prompt("Category (optional)") else {
        return;
    };
    app.add_task(&title, &description, due_date, Some(category));
}

fn edit_flow(app: &mut App, today: NaiveDate) {
    let Some(id) = selected_id(app, today) else {
        return;
    };
    let (current_title, current_due, current_category) = {
        let Some(task) = app.store.get(&id) else {
            return;
        };
        (task.title.clone(), task.due_date, task.category.clone())
    };

    let Some(title) = prompt(&format!("Title [{}] (empty keeps)", current_title)) else {
        return;
    };
    let Some(description) = prompt("Description (empty keeps, '-' clears)") else {
        return;
    };
    let due_hint = current_due
        .map(|d| d.to_string())
        .unwrap_or_else(|| "none".to_string());
    let Some(due_raw) = prompt(&format!("Due date [{}] (YYYY-MM-DD, '-' clears)", due_hint))
    else {
        return;
    };
    let category_hint = current_category.as_deref().unwrap_or("none");
    let Some(category_raw) = prompt(&format!("Category [{}] ('-' clears)", category_hint))
    else {
        return;
    };

    let due_date = match due_raw.as_str() {
        "" => None,
        "-" => Some(None),
        s => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Some(Some(date)),
            Err(_) => {
                app.notify(NoticeKind::Error, "Due date must be YYYY-MM-DD");
                return;
            }
        },
    };

    let patch = TaskPatch {
        title: (!title.is_empty()).then_some(title),
        description: match description.as_str() {
            "" => None,
            "-" => Some(String::new()),
            _ => Some(description),
        },
        due_date,
        category: match category_raw.as_str() {
            "" => None,
            "-" => Some(None),
            _ => Some(Some(category_raw)),
        },
    };
    app.edit_task(&id, patch);
}

fn confirm(message: &str) -> bool {
    prompt(&format!("{} (y/n)", message))
        .map(|answer| matches!(answer.as_str(), "y" | "Y" | "yes"))
        .unwrap_or(false)
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        enable_raw_mode().ok();
        Some(input.trim().to_string())
    } else {
        enable_raw_mode().ok();
        None
    }
}
