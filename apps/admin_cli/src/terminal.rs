//! Stdout rendering of the two pages and line-based stdin input.

use std::{
    io::{self, Write},
    sync::{Mutex, MutexGuard},
};

use anyhow::Result;
use client_core::{otp::OTP_LENGTH, CellView, OtpView, RegistrationView, Surface};
use shared::domain::{Field, Page};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

struct TerminalState {
    page: Page,
    timer_text: String,
    resend_enabled: bool,
    cells: [CellView; OTP_LENGTH],
    focused: usize,
}

pub struct TerminalView {
    state: Mutex<TerminalState>,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self {
            state: Mutex::new(TerminalState {
                page: Page::Registration,
                timer_text: String::new(),
                resend_enabled: false,
                cells: [CellView::default(); OTP_LENGTH],
                focused: 0,
            }),
        }
    }
}

impl TerminalView {
    pub fn page(&self) -> Page {
        self.state().page
    }

    /// `[4][2][_][_][_][_]  resend in (2:41)` style status for the OTP page.
    pub fn otp_status(&self) -> String {
        let state = self.state();
        let cells: String = state
            .cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let value = cell.value.unwrap_or('_');
                if index == state.focused {
                    format!("<{value}>")
                } else {
                    format!("[{value}]")
                }
            })
            .collect();
        let resend = if state.resend_enabled {
            "resend available".to_string()
        } else {
            format!("resend in{}", state.timer_text)
        };
        format!("{cells}  {resend}")
    }

    fn state(&self) -> MutexGuard<'_, TerminalState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Surface for TerminalView {
    fn prompt(&self, message: &str) {
        println!("[notice] {message}");
    }

    fn navigate(&self, page: Page) {
        info!(target_page = page.path(), "navigating");
        self.state().page = page;
    }
}

impl RegistrationView for TerminalView {
    fn set_field_error(&self, field: Field, message: &str) {
        if !message.is_empty() {
            let label = match field {
                Field::Email => "email",
                Field::Name => "name",
                Field::Password => "password",
            };
            println!("  {label}: {message}");
        }
    }
}

impl OtpView for TerminalView {
    fn render_cell(&self, index: usize, cell: CellView) {
        if let Some(slot) = self.state().cells.get_mut(index) {
            *slot = cell;
        }
    }

    fn focus_cell(&self, index: usize) {
        self.state().focused = index;
    }

    fn set_timer_text(&self, text: &str) {
        self.state().timer_text = text.to_string();
    }

    fn set_resend_enabled(&self, enabled: bool) {
        self.state().resend_enabled = enabled;
    }
}

pub struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prints `label: ` and reads one line. `None` at end of input.
    pub async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        print!("{label}: ");
        io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}
