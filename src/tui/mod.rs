mod export;
mod help;
mod keys;
mod state;

use crate::backend::HttpBackend;
use crate::history::{format_created_at, HistoryStore, EMPTY_HISTORY_PLACEHOLDER};
use crate::model::ClientConfig;
use crate::orchestrator::{self, HistorySynchronizer, SubmissionController, UiCommand};
use crate::progress::{step_line, ProgressAnimator, StepState};
use crate::render::{LawCategory, RenderPlan, Section};
use crate::view::{ProgressMarker, TriggerState, HISTORY_LOAD_FAILED_NOTICE};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use keys::{handle_key, KeyAction};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Terminal,
};
use state::{lock, Focus, SharedState, TuiConfirm, TuiView, UiState};
use std::sync::{Arc, Mutex};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc::{self, UnboundedSender};


pub async fn run(cfg: ClientConfig, backend: Arc<HttpBackend>) -> Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let state: SharedState = Arc::new(Mutex::new(UiState::new(cfg.base_url.clone())));
    let view = Arc::new(TuiView::new(state.clone()));
    let confirm = Arc::new(TuiConfirm::new(state.clone()));
    let store = Arc::new(HistoryStore::new(backend.clone()));
    let controller = SubmissionController::new(
        backend,
        view.clone(),
        ProgressAnimator::consult(cfg.step_interval),
    );
    let submitter = Arc::new(HistorySynchronizer::wrap(
        controller,
        store.clone(),
        view.clone(),
    ));

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_state = state.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_state, cmd_tx));

    let res = orchestrator::run_controller(submitter, store, view, confirm, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(state: SharedState, cmd_tx: UnboundedSender<UiCommand>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        if dirty || last_tick.elapsed() >= tick_rate {
            let s = lock(&state);
            terminal.draw(|f| draw(f.area(), f, &s)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            let Ok(Event::Key(k)) = event::read() else {
                continue;
            };
            if k.kind != KeyEventKind::Press {
                continue;
            }

            let mut s = lock(&state);
            match handle_key(&mut s, k) {
                KeyAction::None => {}
                KeyAction::Send(cmd) => {
                    if cmd_tx.send(cmd).is_err() {
                        break Err(anyhow::anyhow!("controller stopped"));
                    }
                }
                KeyAction::ExportSelected => {
                    if let Some(record) = s.selected_record().cloned() {
                        s.info = match export::export_record_json(&record) {
                            Ok(path) => format!("Exported JSON: {}", path.display()),
                            Err(e) => format!("JSON export failed: {e:#}"),
                        };
                    }
                }
                KeyAction::CopySelected => {
                    if let Some(record) = s.selected_record().cloned() {
                        s.info = match export::copy_to_clipboard(&export::clipboard_text(&record)) {
                            Ok(()) => format!("Copied #{} to clipboard", record.id),
                            Err(e) => format!("Copy failed: {e:#}"),
                        };
                    }
                }
                KeyAction::Quit => {
                    if let Some(pending) = s.pending_confirm.take() {
                        pending.answer(false);
                    }
                    let _ = cmd_tx.send(UiCommand::Quit);
                    break Ok(());
                }
            }
            // Redraw right away so typing feels immediate.
            dirty = true;
        }
    };

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);

    draw_header(chunks[0], f, state);

    let (history, main) = split_body(chunks[1], state);
    if let Some(area) = history {
        draw_history(area, f, state);
    }
    if let Some(area) = main {
        draw_main(area, f, state);
    }
    draw_status(chunks[2], f, state);

    if state.show_help {
        help::draw_help(centered(area, 70, 28), f);
    }
    if let Some(pending) = &state.pending_confirm {
        draw_confirm(centered(area, 44, 5), f, &pending.prompt);
    }
}

const SIDEBAR_WIDTH: u16 = 34;
const SIDEBAR_MIN_BODY_WIDTH: u16 = 60;

/// Areas for the history panel and the main column. A terminal too narrow
/// for both shows whichever one has focus.
fn split_body(area: Rect, state: &UiState) -> (Option<Rect>, Option<Rect>) {
    if !state.history_open {
        return (None, Some(area));
    }
    if area.width >= SIDEBAR_MIN_BODY_WIDTH {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)].as_ref())
            .split(area);
        return (Some(cols[0]), Some(cols[1]));
    }
    match state.focus {
        Focus::History => (Some(area), None),
        Focus::Input => (None, Some(area)),
    }
}

fn draw_header(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let p = Paragraph::new(Line::from(vec![
        Span::styled("⚖️ 法律諮詢", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(state.base_url.clone(), Style::default().fg(Color::Gray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("legal-consult"),
    );
    f.render_widget(p, area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_main(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let progress_height = (state.progress.len() + usize::from(state.marker.is_some())).max(1) as u16 + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(6),               // Query input
                Constraint::Length(1),               // Submit trigger
                Constraint::Length(progress_height), // Progress steps
                Constraint::Min(0),                  // Analysis
            ]
            .as_ref(),
        )
        .split(area);

    let input = Paragraph::new(state.query_input.as_str())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(state.focus == Focus::Input))
                .title("案件描述 (F2-F5: 範例)"),
        );
    f.render_widget(input, rows[0]);

    let trigger_style = match state.trigger {
        TriggerState::Idle => Style::default().fg(Color::Black).bg(Color::Green),
        TriggerState::Busy => Style::default().fg(Color::Gray).bg(Color::DarkGray),
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(format!(" {} ", state.trigger.label()), trigger_style),
        ])),
        rows[1],
    );

    draw_progress(rows[2], f, state);

    if state.result_visible {
        if let Some(plan) = &state.result {
            draw_result(rows[3], f, plan, state.result_scroll);
        }
    }
}

fn draw_progress(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut lines: Vec<Line> = state
        .progress
        .iter()
        .map(|(label, step)| match step {
            StepState::Active => Line::styled(
                step_line(label, *step),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            StepState::Settled => {
                Line::styled(step_line(label, *step), Style::default().fg(Color::Gray))
            }
        })
        .collect();
    if let Some(marker) = state.marker {
        let color = match marker {
            ProgressMarker::Success => Color::Green,
            ProgressMarker::Error => Color::Red,
        };
        lines.push(Line::styled(marker.text(), Style::default().fg(color)));
    }

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("進度"));
    f.render_widget(p, area);
}

fn category_style(category: LawCategory) -> Style {
    match category {
        LawCategory::Criminal => Style::default().fg(Color::White).bg(Color::Red),
        LawCategory::Civil => Style::default().fg(Color::White).bg(Color::Blue),
    }
}

fn result_lines(plan: &RenderPlan) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::Gray);
    let mut lines = vec![Line::styled("分析總結", heading)];
    lines.extend(plan.summary_lines.iter().map(|l| Line::from(l.clone())));
    if !plan.domains.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("領域: ", muted),
            Span::raw(plan.domains.join(" / ")),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::styled("相關法條", heading));
    match &plan.statutes {
        Section::Cards(cards) => {
            for card in cards {
                lines.push(Line::from(vec![
                    Span::styled(format!(" {} ", card.category.badge()), category_style(card.category)),
                    Span::raw(" "),
                    Span::styled(card.law_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(" "),
                    Span::styled(card.article_id.clone(), muted),
                ]));
                lines.push(Line::from(format!("  {}", card.content)));
            }
        }
        Section::Placeholder(text) => lines.push(Line::styled(*text, muted)),
    }

    lines.push(Line::from(""));
    lines.push(Line::styled("參考判例", heading));
    match &plan.cases {
        Section::Cards(cards) => {
            for card in cards {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {} ", card.court),
                        Style::default().fg(Color::Black).bg(Color::Cyan),
                    ),
                    Span::raw(" "),
                    Span::styled(card.case_id.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]));
                lines.push(Line::from(format!("  {}", card.summary)));
            }
        }
        Section::Placeholder(text) => lines.push(Line::styled(*text, muted)),
    }
    lines
}

fn draw_result(area: Rect, f: &mut ratatui::Frame, plan: &RenderPlan, scroll: u16) {
    let p = Paragraph::new(result_lines(plan))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("分析結果 (PgUp/PgDn)"),
        );
    f.render_widget(p, area);
}

fn draw_history(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let focused = state.focus == Focus::History;
    let max_items = (area.height as usize).saturating_sub(2) / 2;

    let mut lines: Vec<Line> = Vec::new();
    if state.history.is_empty() {
        let text = if state.history_loaded {
            EMPTY_HISTORY_PLACEHOLDER
        } else if state.history_failed {
            HISTORY_LOAD_FAILED_NOTICE
        } else {
            "載入中…"
        };
        lines.push(Line::styled(text, Style::default().fg(Color::Gray)));
    }

    // Keep the selection on screen.
    let offset = state
        .history_selected
        .saturating_sub(max_items.saturating_sub(1));
    for (i, r) in state.history.iter().enumerate().skip(offset).take(max_items) {
        let selected = focused && i == state.history_selected;
        let base = if selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let query: String = r.query.replace('\n', " ");
        lines.push(Line::styled(query, base.add_modifier(Modifier::BOLD)));
        lines.push(Line::styled(
            format_created_at(&r.created_at),
            base.fg(Color::Gray),
        ));
    }

    let title = if focused {
        "歷史紀錄 (Enter/d/e/y)"
    } else {
        "歷史紀錄 (Tab)"
    };
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(focused))
            .title(title),
    );
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let line = if state.info.is_empty() {
        Line::styled(
            "Enter: submit  Tab: history  F1: help  Ctrl-C: quit",
            Style::default().fg(Color::Gray),
        )
    } else {
        Line::styled(state.info.clone(), Style::default().fg(Color::Yellow))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_confirm(area: Rect, f: &mut ratatui::Frame, prompt: &str) {
    let p = Paragraph::new(vec![
        Line::from(prompt.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Magenta)),
            Span::raw(": yes   "),
            Span::styled("n", Style::default().fg(Color::Magenta)),
            Span::raw(": no"),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Confirm"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

/// A rect of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
