//! Interactive menu: region banner, action hints, stage log panel.

use super::styles;
use crate::app::{App, CycleOutcome};
use crate::common::progress::{ChannelObserver, Direction, StageResult};
use crate::region::ResolvedLocator;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Limit frames (about 20 FPS); left unchecked it kills performance.
const RENDER_INTERVAL: Duration = Duration::from_millis(50);
const MAX_LOG_LINES: usize = 500;

enum LogKind {
    Info,
    Success,
    Failure,
}

struct LogLine {
    kind: LogKind,
    text: String,
}

impl LogLine {
    fn info(text: String) -> Self {
        Self {
            kind: LogKind::Info,
            text,
        }
    }

    fn from_stage(result: &StageResult) -> Self {
        let kind = if result.ok {
            LogKind::Success
        } else {
            LogKind::Failure
        };
        let mark = if result.ok { "✓" } else { "✗" };
        let text = match &result.detail {
            Some(detail) => format!("{mark} {}: {detail}", result.stage.label()),
            None => format!("{mark} {}", result.stage.label()),
        };
        Self { kind, text }
    }
}

fn push_log(log: &mut Vec<LogLine>, line: LogLine) {
    log.push(line);
    if log.len() > MAX_LOG_LINES {
        log.drain(..log.len() - MAX_LOG_LINES);
    }
}

/// Run the menu until the user quits.
pub async fn run_menu(app: &App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = menu_loop(app, &mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

async fn menu_loop(app: &App, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut log: Vec<LogLine> = Vec::new();
    let mut locator = app.resolve().await;

    let mut render_tick = interval(RENDER_INTERVAL);
    render_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Ctrl+C exits like the HOME button in the original.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    let ctrl_c_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            _ = render_tick.tick() => {
                terminal.draw(|f| render(f, app, &locator, &log))?;

                // Non-blocking poll keeps the redraw cadence steady.
                if event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        match key.code {
                            KeyCode::Char('q' | 'Q') | KeyCode::Esc => break,
                            KeyCode::Char('d' | 'D') if locator.is_resolved() => {
                                run_cycle(app, Direction::Dump, &locator, &mut log, terminal).await?;
                                locator = app.resolve().await;
                            }
                            KeyCode::Char('r' | 'R') if locator.is_resolved() => {
                                run_cycle(app, Direction::Restore, &locator, &mut log, terminal).await?;
                                locator = app.resolve().await;
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    ctrl_c_task.abort();
    let _ = ctrl_c_task.await;

    Ok(())
}

/// One triggered cycle. The menu is blocked for the duration; stage results
/// are drawn as the engine reports them.
async fn run_cycle(
    app: &App,
    direction: Direction,
    locator: &ResolvedLocator,
    log: &mut Vec<LogLine>,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<()> {
    if let Some(entry) = locator.entry() {
        let backup = app.config().backup_path();
        let (source, dest) = match direction {
            Direction::Dump => (
                entry.source_path.display().to_string(),
                backup.display().to_string(),
            ),
            Direction::Restore => (
                backup.display().to_string(),
                entry.source_path.display().to_string(),
            ),
        };
        push_log(
            log,
            LogLine::info(format!("Beginning theme data {}...", direction.label())),
        );
        push_log(log, LogLine::info(format!("Source: {source}")));
        push_log(log, LogLine::info(format!("Destination: {dest}")));
    }

    let (observer, mut stages) = ChannelObserver::unbounded();
    let cycle = app.run_trigger(direction, &observer);
    tokio::pin!(cycle);

    let outcome = loop {
        tokio::select! {
            Some(result) = stages.recv() => {
                push_log(log, LogLine::from_stage(&result));
                terminal.draw(|f| render(f, app, locator, log))?;
            }
            outcome = &mut cycle => break outcome,
        }
    };

    // Stage results that raced the completion branch.
    while let Ok(result) = stages.try_recv() {
        push_log(log, LogLine::from_stage(&result));
    }

    match outcome {
        CycleOutcome::Blocked => push_log(
            log,
            LogLine {
                kind: LogKind::Failure,
                text: "No region resolved; transfer blocked.".to_string(),
            },
        ),
        CycleOutcome::Ran(outcome) => {
            let line = if outcome.succeeded() {
                LogLine {
                    kind: LogKind::Success,
                    text: format!(
                        "Theme file {} finished successfully.",
                        outcome.direction.label()
                    ),
                }
            } else {
                LogLine {
                    kind: LogKind::Failure,
                    text: format!("Theme file {} failed.", outcome.direction.label()),
                }
            };
            push_log(log, line);
        }
    }
    push_log(
        log,
        LogLine::info("----------------------------------------".to_string()),
    );

    terminal.draw(|f| render(f, app, locator, log))?;

    // Display pause so the stage log is readable before the repaint.
    tokio::time::sleep(app.pause()).await;

    Ok(())
}

fn render(f: &mut Frame, app: &App, locator: &ResolvedLocator, log: &[LogLine]) {
    let areas = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(5),
        ])
        .split(f.size());

    render_banner(f, areas[0]);
    render_status(f, app, locator, areas[1]);
    render_log(f, log, areas[2]);
}

fn render_banner(f: &mut Frame, area: Rect) {
    let title = format!("themevault (v{})", env!("CARGO_PKG_VERSION"));
    let widget = Paragraph::new(title)
        .style(styles::accent_style())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_status(f: &mut Frame, app: &App, locator: &ResolvedLocator, area: Rect) {
    let lines: Vec<Line> = match locator.entry() {
        Some(entry) => {
            let mut lines = vec![
                Line::raw(format!("Region detected by system menu: {}", entry.region)),
                Line::raw(format!("Theme file: {}", entry.asset_name())),
            ];
            if app.config().tui.show_hints {
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "Press D to dump system menu assets.",
                    styles::muted_style(),
                ));
                lines.push(Line::styled(
                    "Press R to restore system menu assets.",
                    styles::muted_style(),
                ));
                lines.push(Line::styled("Press Q to exit.", styles::muted_style()));
            }
            lines
        }
        None => vec![
            Line::styled(
                "Error: system menu is not correctly installed!",
                styles::failure_style(),
            ),
            Line::raw("Reinstall the system menu and try again."),
            Line::raw(""),
            Line::styled("Press Q to exit.", styles::muted_style()),
        ],
    };

    let widget = Paragraph::new(lines).block(Block::default().title("Menu").borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_log(f: &mut Frame, log: &[LogLine], area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = log.len().saturating_sub(visible);

    let lines: Vec<Line> = log[start..]
        .iter()
        .map(|entry| {
            let style = match entry.kind {
                LogKind::Info => styles::muted_style(),
                LogKind::Success => styles::success_style(),
                LogKind::Failure => styles::failure_style(),
            };
            Line::styled(entry.text.clone(), style)
        })
        .collect();

    let widget = Paragraph::new(lines).block(Block::default().title("Log").borders(Borders::ALL));
    f.render_widget(widget, area);
}
