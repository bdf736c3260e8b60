//! Interactive calculator screen.
//!
//! A raw-mode terminal loop over two screens: the keypad/display screen and
//! the day-grouped history screen. All mutations go through [`History`];
//! the grouped view is re-derived from a fresh snapshot on every frame.

use crate::errors::CalcError;
use crate::eval::{evaluate, format_result};
use crate::expression::Expression;
use crate::history::History;
use anyhow::Result;
use crossterm::cursor::{self, MoveTo};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use std::io::{Write, stdout};
use tally_history::HistoryEntry;
use tracing::{debug, warn};

pub mod key_action;
use key_action::{KeyAction, Screen, determine_key_action};

pub struct Repl {
    history: History,
    expression: Expression,
    last_result: Option<String>,
    message: Option<Message>,
    screen: Screen,
    selected: usize,
    clipboard: Option<arboard::Clipboard>,
}

enum Message {
    Error(String),
    Notice(String),
}

impl Repl {
    pub fn new(history: History) -> Self {
        let clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                warn!("clipboard unavailable: {}", err);
                None
            }
        };

        Repl {
            history,
            expression: Expression::new(),
            last_result: None,
            message: None,
            screen: Screen::Input,
            selected: 0,
            clipboard,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut out = stdout();
        enable_raw_mode()?;
        queue!(out, EnterAlternateScreen, cursor::Hide)?;
        out.flush()?;

        let result = self.run_loop(&mut out);

        queue!(out, cursor::Show, LeaveAlternateScreen).ok();
        out.flush().ok();
        disable_raw_mode().ok();
        result
    }

    fn run_loop(&mut self, out: &mut std::io::Stdout) -> Result<()> {
        loop {
            self.render(out)?;

            let key = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };

            match determine_key_action(&key, self.screen) {
                KeyAction::InsertToken(token) => {
                    self.message = None;
                    self.expression.push_token(token);
                }
                KeyAction::Evaluate => self.evaluate_input(),
                KeyAction::DeleteLast => {
                    self.message = None;
                    self.expression.delete_last();
                }
                KeyAction::ClearInput => {
                    self.message = None;
                    self.last_result = None;
                    self.expression.clear();
                }
                KeyAction::OpenHistory => {
                    self.screen = Screen::History;
                    self.selected = 0;
                    self.message = None;
                }
                KeyAction::CloseHistory => {
                    self.screen = Screen::Input;
                    self.message = None;
                }
                KeyAction::SelectPrevious => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyAction::SelectNext => {
                    let count = self.history.len();
                    if count > 0 && self.selected < count - 1 {
                        self.selected += 1;
                    }
                }
                KeyAction::DeleteEntry => self.delete_selected(),
                KeyAction::EditMemo => self.edit_selected_memo(out)?,
                KeyAction::CopyEntry => self.copy_selected(),
                KeyAction::Quit => break,
                KeyAction::Unsupported => {}
            }
        }
        Ok(())
    }

    fn evaluate_input(&mut self) {
        match evaluate(self.expression.as_str()) {
            Ok(value) => {
                let formatted = format_result(value);
                self.last_result =
                    Some(format!("{} = {}", self.expression.as_str(), formatted));
                match self
                    .history
                    .record(self.expression.as_str(), &formatted)
                {
                    Ok(entry) => debug!("recorded entry {}", entry.id),
                    Err(err) => {
                        warn!("failed to record history: {}", err);
                        self.message = Some(Message::Error(format!(
                            "history not saved: {}",
                            err
                        )));
                    }
                }
                self.expression.clear();
            }
            Err(CalcError::InvalidExpression(msg)) => {
                // Recovery: surface the message and reset the display
                self.message = Some(Message::Error(msg));
                self.last_result = None;
                self.expression.clear();
            }
            Err(err) => {
                self.message = Some(Message::Error(err.to_string()));
                self.expression.clear();
            }
        }
    }

    /// The entry currently under the cursor, in grouped display order.
    fn selected_entry(&self) -> Option<HistoryEntry> {
        self.history
            .grouped()
            .into_iter()
            .flat_map(|g| g.entries)
            .nth(self.selected)
    }

    fn delete_selected(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        match self.history.delete(entry.id) {
            Ok(()) => {
                if self.selected >= self.history.len() {
                    self.selected = self.history.len().saturating_sub(1);
                }
                self.message = Some(Message::Notice("entry deleted".to_string()));
            }
            Err(err) => {
                warn!("failed to delete entry {}: {}", entry.id, err);
                self.message = Some(Message::Error(format!("delete failed: {}", err)));
            }
        }
    }

    fn edit_selected_memo(&mut self, out: &mut std::io::Stdout) -> Result<()> {
        let Some(entry) = self.selected_entry() else {
            return Ok(());
        };

        if let Some(memo) = read_memo_line(out, &entry.memo)? {
            // Best effort: a lost memo never blocks the calculator
            match self.history.update_memo(entry.id, &memo) {
                Ok(true) => self.message = Some(Message::Notice("memo saved".to_string())),
                Ok(false) => debug!("memo target {} vanished", entry.id),
                Err(err) => warn!("failed to save memo for {}: {}", entry.id, err),
            }
        }
        Ok(())
    }

    fn copy_selected(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let text = format!("{} = {}", entry.expression, entry.result);
        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(text) {
                Ok(()) => self.message = Some(Message::Notice("copied".to_string())),
                Err(err) => {
                    warn!("clipboard copy failed: {}", err);
                    self.message = Some(Message::Error("copy failed".to_string()));
                }
            },
            None => {
                self.message = Some(Message::Error("clipboard unavailable".to_string()));
            }
        }
    }

    fn render(&self, out: &mut std::io::Stdout) -> Result<()> {
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
        match self.screen {
            Screen::Input => self.render_input(out)?,
            Screen::History => self.render_history(out)?,
        }
        out.flush()?;
        Ok(())
    }

    fn render_input(&self, out: &mut std::io::Stdout) -> Result<()> {
        queue!(
            out,
            Print("tally".bold()),
            Print("\r\n\r\n"),
            Print("> "),
            Print(self.expression.as_str().bold()),
            Print("\r\n")
        )?;

        if let Some(result) = &self.last_result {
            queue!(out, Print(result.as_str().with(Color::Green)), Print("\r\n"))?;
        }
        self.render_message(out)?;

        queue!(
            out,
            Print("\r\n"),
            Print(
                "[0-9 . ( ) + - * /] type  [enter] =  [bksp] del  [esc] clear  [tab] history  [q] quit"
                    .with(Color::DarkGrey)
            ),
            Print("\r\n")
        )?;
        Ok(())
    }

    fn render_history(&self, out: &mut std::io::Stdout) -> Result<()> {
        let groups = self.history.grouped();
        queue!(
            out,
            Print(format!("history ({} entries)", self.history.len()).bold()),
            Print("\r\n")
        )?;

        // Lines paired with their flattened entry index for windowing
        let mut lines: Vec<(String, Option<usize>, bool)> = Vec::new();
        let mut flat_idx = 0usize;
        for group in &groups {
            lines.push((group.day.format("%Y-%m-%d").to_string(), None, false));
            for entry in &group.entries {
                let selected = flat_idx == self.selected;
                let mark = if selected { ">" } else { " " };
                lines.push((
                    format!("  {} {} = {}", mark, entry.expression, entry.result),
                    Some(flat_idx),
                    selected,
                ));
                if !entry.memo.is_empty() {
                    lines.push((format!("      memo: {}", entry.memo), None, selected));
                }
                flat_idx += 1;
            }
        }

        let (_, rows) = terminal::size().unwrap_or((80, 24));
        let visible = rows.saturating_sub(4).max(1) as usize;
        let cursor_line = lines
            .iter()
            .position(|(_, idx, _)| *idx == Some(self.selected))
            .unwrap_or(0);
        let start = cursor_line.saturating_sub(visible / 2).min(
            lines.len().saturating_sub(visible),
        );

        for (text, idx, selected) in lines.iter().skip(start).take(visible) {
            if *selected {
                queue!(out, Print(text.as_str().bold()), Print("\r\n"))?;
            } else if idx.is_none() && !text.starts_with(' ') {
                queue!(out, Print(text.as_str().with(Color::Cyan)), Print("\r\n"))?;
            } else {
                queue!(out, Print(text.as_str()), Print("\r\n"))?;
            }
        }
        if groups.is_empty() {
            queue!(out, Print("no calculations yet".with(Color::DarkGrey)), Print("\r\n"))?;
        }

        self.render_message(out)?;
        queue!(
            out,
            Print(
                "[up/down] move  [d] delete  [m] memo  [y] copy  [esc] back  [q] quit"
                    .with(Color::DarkGrey)
            ),
            Print("\r\n")
        )?;
        Ok(())
    }

    fn render_message(&self, out: &mut std::io::Stdout) -> Result<()> {
        match &self.message {
            Some(Message::Error(msg)) => {
                queue!(out, Print(msg.as_str().with(Color::Red)), Print("\r\n"))?;
            }
            Some(Message::Notice(msg)) => {
                queue!(out, Print(msg.as_str().with(Color::DarkGrey)), Print("\r\n"))?;
            }
            None => {}
        }
        Ok(())
    }
}

/// Inline single-line memo editor. Enter saves, Esc cancels.
fn read_memo_line(out: &mut std::io::Stdout, initial: &str) -> Result<Option<String>> {
    let mut memo = initial.to_string();

    loop {
        queue!(
            out,
            Print("\r"),
            Clear(ClearType::CurrentLine),
            Print("memo: ".with(Color::Yellow)),
            Print(memo.as_str())
        )?;
        out.flush()?;

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };
        match key.code {
            KeyCode::Enter => return Ok(Some(memo)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Backspace => {
                memo.pop();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Char(c) => memo.push(c),
            _ => {}
        }
    }
}
