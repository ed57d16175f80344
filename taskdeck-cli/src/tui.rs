use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use taskdeck_sync::{SyncEnvelope, SyncEvent, SyncRequest};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::app::{App, Focus, KeyOutcome, Notice};

pub fn run_tui(tick: Duration, requests: UnboundedSender<SyncEnvelope>, events: Receiver<SyncEvent>) -> Result<()> {
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, tick, &requests, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

/// Put the terminal back before the default hook prints, so a panic does not
/// leave the shell in raw mode on the alternate screen.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    tick: Duration,
    requests: &UnboundedSender<SyncEnvelope>,
    events: &Receiver<SyncEvent>,
) -> Result<()> {
    let mut app = App::new();
    info!("tui started");

    // initial fetch
    let first = app.request(SyncRequest::Load);
    send(requests, first, &mut app);

    loop {
        while let Ok(ev) = events.try_recv() {
            app.apply_event(ev, chrono::Utc::now());
        }

        terminal.draw(|f| draw(f, &app))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key) {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Quit => break,
                    KeyOutcome::Send(envelope) => send(requests, envelope, &mut app),
                }
            }
        }
    }

    info!("tui stopped");
    Ok(())
}

fn send(requests: &UnboundedSender<SyncEnvelope>, envelope: SyncEnvelope, app: &mut App) {
    if requests.send(envelope).is_err() {
        warn!("sync worker is gone");
        app.notice = Some(Notice::Error("sync worker stopped; restart taskdeck".to_string()));
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_field(f, "title", &app.board.draft().title, app.focus == Focus::Title, chunks[1]);
    draw_field(
        f,
        "description",
        &app.board.draft().description,
        app.focus == Focus::Description,
        chunks[2],
    );
    draw_tasks(f, app, chunks[3]);

    let notice = match &app.notice {
        Some(Notice::Info(m)) => Line::from(Span::styled(m.as_str(), Style::default().fg(Color::Green))),
        Some(Notice::Error(m)) => Line::from(Span::styled(m.as_str(), Style::default().fg(Color::Red))),
        None => Line::raw(""),
    };
    f.render_widget(Paragraph::new(notice), chunks[4]);

    let help = "Tab=focus  Enter=add  Space/t=toggle  d=delete  r=reload  Esc=quit";
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(help, Style::default().fg(Color::Gray)))),
        chunks[5],
    );
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let synced = app
        .board
        .synced_at()
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut spans = vec![
        Span::styled(
            "Task Manager",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  synced: {synced}")),
    ];
    if app.in_flight() > 0 {
        spans.push(Span::styled(
            format!("  ({} in flight)", app.in_flight()),
            Style::default().fg(Color::Cyan),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_field(f: &mut Frame, title: &str, value: &str, focused: bool, area: Rect) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(border);
    let mut text = value.to_string();
    if focused {
        text.push('_');
    }
    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_tasks(f: &mut Frame, app: &App, area: Rect) {
    let counts = app.board.counts();
    let title = format!("tasks ({} pending, {} completed)", counts.pending, counts.completed);

    let items: Vec<ListItem> = app
        .board
        .tasks()
        .iter()
        .map(|t| {
            let (label_style, title_style) = if t.status.is_completed() {
                (
                    Style::default().fg(Color::Green),
                    Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM),
                )
            } else {
                (Style::default().fg(Color::Yellow), Style::default().add_modifier(Modifier::BOLD))
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("[{}] ", t.status.label()), label_style),
                    Span::styled(t.title.clone(), title_style),
                ]),
                Line::from(Span::styled(
                    format!("    {}", t.description),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let border = if app.focus == Focus::List {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title).border_style(border))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.selected_index());
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_hook_restores_and_still_unwinds() {
        install_panic_hook();
        let res = std::panic::catch_unwind(|| panic!("boom"));
        let _ = std::panic::take_hook();

        let payload = res.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
    }
}
