//! Pure mapping from key presses to calculator intents.
//!
//! Kept free of side effects so the keymap is testable without a terminal.

use crate::expression::{DIVIDE, MULTIPLY};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const CTRL: KeyModifiers = KeyModifiers::CONTROL;

/// Which screen the keypress happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Input,
    History,
}

/// User intent derived from a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // Input screen
    InsertToken(char),
    Evaluate,
    DeleteLast,
    ClearInput,
    OpenHistory,

    // History screen
    SelectPrevious,
    SelectNext,
    DeleteEntry,
    EditMemo,
    CopyEntry,
    CloseHistory,

    Quit,
    Unsupported,
}

pub fn determine_key_action(key: &KeyEvent, screen: Screen) -> KeyAction {
    if key.modifiers.contains(CTRL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    match screen {
        Screen::Input => input_action(key),
        Screen::History => history_action(key),
    }
}

fn input_action(key: &KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => KeyAction::InsertToken(c),
        KeyCode::Char(c @ ('.' | '(' | ')' | '+' | '-')) => KeyAction::InsertToken(c),
        KeyCode::Char('*') | KeyCode::Char('x') => KeyAction::InsertToken(MULTIPLY),
        KeyCode::Char('/') => KeyAction::InsertToken(DIVIDE),
        KeyCode::Enter | KeyCode::Char('=') => KeyAction::Evaluate,
        KeyCode::Backspace => KeyAction::DeleteLast,
        KeyCode::Esc => KeyAction::ClearInput,
        KeyCode::Tab | KeyCode::Char('h') => KeyAction::OpenHistory,
        KeyCode::Char('q') => KeyAction::Quit,
        _ => KeyAction::Unsupported,
    }
}

fn history_action(key: &KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => KeyAction::SelectPrevious,
        KeyCode::Down | KeyCode::Char('j') => KeyAction::SelectNext,
        KeyCode::Char('d') | KeyCode::Delete => KeyAction::DeleteEntry,
        KeyCode::Char('m') => KeyAction::EditMemo,
        KeyCode::Char('y') | KeyCode::Char('c') => KeyAction::CopyEntry,
        KeyCode::Esc | KeyCode::Tab | KeyCode::Char('h') => KeyAction::CloseHistory,
        KeyCode::Char('q') => KeyAction::Quit,
        _ => KeyAction::Unsupported,
    }
}
