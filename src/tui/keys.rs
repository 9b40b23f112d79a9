//! Key handling for the TUI. Pure state transitions plus the command each key
//! asks the controller for; side effects on the filesystem and clipboard are
//! reported back as [`KeyAction`] and carried out by the UI loop.

use super::state::{Focus, UiState};
use crate::orchestrator::UiCommand;
use crate::prompts::SamplePrompt;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[cfg(test)]
#[path = "keys_test.rs"]
mod keys_test;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyAction {
    None,
    Send(UiCommand),
    ExportSelected,
    CopySelected,
    Quit,
}

const SCROLL_STEP: u16 = 5;

pub(crate) fn handle_key(state: &mut UiState, key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return KeyAction::Quit,
            KeyCode::Char('r') => {
                state.info = "Refreshing history…".into();
                return KeyAction::Send(UiCommand::RefreshHistory);
            }
            _ => {}
        }
    }

    if let Some(pending) = state.pending_confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => pending.answer(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => pending.answer(false),
            _ => state.pending_confirm = Some(pending),
        }
        return KeyAction::None;
    }

    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?')) {
            state.show_help = false;
        }
        return KeyAction::None;
    }

    match key.code {
        KeyCode::F(1) => {
            state.show_help = true;
            return KeyAction::None;
        }
        KeyCode::F(n @ 2..=5) => {
            let sample = SamplePrompt::ALL[usize::from(n - 2)];
            state.query_input = sample.text().to_string();
            state.focus = Focus::Input;
            state.info = format!("Loaded example: {}", sample.title());
            return KeyAction::None;
        }
        KeyCode::F(6) => {
            if state.history_open {
                close_history(state);
            } else {
                state.history_open = true;
                state.focus = Focus::History;
            }
            return KeyAction::None;
        }
        KeyCode::Tab => {
            state.focus = match state.focus {
                Focus::Input => {
                    state.history_open = true;
                    Focus::History
                }
                Focus::History => Focus::Input,
            };
            return KeyAction::None;
        }
        KeyCode::PageUp => {
            state.result_scroll = state.result_scroll.saturating_sub(SCROLL_STEP);
            return KeyAction::None;
        }
        KeyCode::PageDown => {
            state.result_scroll = state.result_scroll.saturating_add(SCROLL_STEP);
            return KeyAction::None;
        }
        _ => {}
    }

    match state.focus {
        Focus::Input => handle_input_key(state, key),
        Focus::History => handle_history_key(state, key),
    }
}

fn close_history(state: &mut UiState) {
    state.history_open = false;
    state.focus = Focus::Input;
}

fn handle_input_key(state: &mut UiState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            state.query_input.push('\n');
            KeyAction::None
        }
        KeyCode::Enter => {
            // Mirrors the disabled button; the controller rejects it as well.
            if !state.trigger.is_enabled() {
                return KeyAction::None;
            }
            state.info.clear();
            KeyAction::Send(UiCommand::Submit(state.query_input.clone()))
        }
        KeyCode::Backspace => {
            state.query_input.pop();
            KeyAction::None
        }
        KeyCode::Esc => {
            state.query_input.clear();
            KeyAction::None
        }
        KeyCode::Char(c) => {
            state.query_input.push(c);
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn handle_history_key(state: &mut UiState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.history_selected = state.history_selected.saturating_sub(1);
            KeyAction::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.history_selected + 1 < state.history.len() {
                state.history_selected += 1;
            }
            KeyAction::None
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            KeyAction::None
        }
        KeyCode::Esc => {
            state.focus = Focus::Input;
            KeyAction::None
        }
        KeyCode::Char('h') => {
            close_history(state);
            KeyAction::None
        }
        KeyCode::Enter => match state.selected_record() {
            Some(r) => KeyAction::Send(UiCommand::Restore(r.id)),
            None => KeyAction::None,
        },
        KeyCode::Char('d') => match state.selected_record() {
            Some(r) => KeyAction::Send(UiCommand::Delete(r.id)),
            None => KeyAction::None,
        },
        KeyCode::Char('e') if state.selected_record().is_some() => KeyAction::ExportSelected,
        KeyCode::Char('y') if state.selected_record().is_some() => KeyAction::CopySelected,
        _ => KeyAction::None,
    }
}
