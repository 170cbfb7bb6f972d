//! OTP entry page: six digit cells, the resend countdown, and the verify/resend round trips.

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use shared::{
    domain::{mask_sensitive, Page},
    protocol::{OtpRequestForm, OtpSent, VerifyOtpForm, VerifyStatus},
};
use storage::{load_pending, SessionStore};
use tokio::{runtime::Handle, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{
    events::{FlowContext, FlowError},
    view::{CellView, OtpView},
    AdminApi,
};

pub const OTP_LENGTH: usize = 6;
pub const COUNTDOWN_SECONDS: u32 = 180;
pub const PULSE_DURATION: Duration = Duration::from_millis(500);
const TICK_PERIOD: Duration = Duration::from_secs(1);

pub const INCOMPLETE_MESSAGE: &str = "Please enter a valid 6-digit OTP";
pub const SESSION_EXPIRED_MESSAGE: &str =
    "Session expired. Please restart the registration process.";
pub const REGISTERED_MESSAGE: &str = "Registration successful! Welcome to YUS.";
pub const INVALID_OTP_MESSAGE: &str = "Invalid OTP. Please try again.";
pub const ADMIN_EXISTS_MESSAGE: &str = "Admin already exists with this email.";
pub const VERIFY_NETWORK_MESSAGE: &str = "Network error during verification. Please try again.";
pub const RESENT_MESSAGE: &str = "OTP has been resent to your email!";
pub const RESEND_FAILED_MESSAGE: &str = "Failed to resend OTP. Please try again.";
pub const RESEND_NETWORK_MESSAGE: &str = "Network error while resending OTP.";

/// Six single-digit cells; the code is their concatenation in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpEntry {
    cells: [Option<char>; OTP_LENGTH],
}

impl OtpEntry {
    pub fn cell(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().flatten()
    }

    /// Replaces the cell's digit. Non-digits and out-of-range indexes leave the entry untouched.
    pub fn set(&mut self, index: usize, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = Some(digit);
                true
            }
            None => false,
        }
    }

    pub fn clear_cell(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = None;
        }
    }

    pub fn clear(&mut self) {
        self.cells = [None; OTP_LENGTH];
    }

    pub fn code(&self) -> String {
        self.cells.iter().flatten().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Timing,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    phase: TimerPhase,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            phase: TimerPhase::Idle,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == TimerPhase::Timing
    }

    pub fn start(&mut self) {
        self.phase = if self.remaining > 0 {
            TimerPhase::Timing
        } else {
            TimerPhase::Expired
        };
    }

    /// One second elapsed. Returns false when the countdown was not running.
    pub fn tick(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.phase = TimerPhase::Expired;
        }
        true
    }

    pub fn resend_allowed(&self) -> bool {
        self.remaining == 0
    }

    /// ` (M:SS)` while time remains, empty once it runs out.
    pub fn display(&self) -> String {
        if self.remaining > 0 {
            format!(" ({}:{:02})", self.remaining / 60, self.remaining % 60)
        } else {
            String::new()
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(COUNTDOWN_SECONDS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Incomplete,
    SessionExpired,
    Registered,
    InvalidOtp,
    AdminExists,
    Unexpected(String),
    NetworkError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    TimerRunning,
    SessionExpired,
    Resent,
    Failed,
    NetworkError,
}

#[derive(Default)]
struct OtpState {
    entry: OtpEntry,
    pulsing: [bool; OTP_LENGTH],
    focused: Option<usize>,
    countdown: Countdown,
    ticker: Option<JoinHandle<()>>,
    ticker_generation: u64,
}

impl OtpState {
    fn cell_view(&self, index: usize) -> CellView {
        let value = self.entry.cell(index);
        CellView {
            value,
            filled: value.is_some(),
            pulse: self.pulsing[index],
        }
    }

    /// Aborts the current tick source and invalidates any tick it already has in flight.
    fn retire_ticker(&mut self) -> u64 {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.ticker_generation += 1;
        self.ticker_generation
    }
}

pub struct OtpController {
    api: Arc<dyn AdminApi>,
    store: Arc<dyn SessionStore>,
    view: Arc<dyn OtpView>,
    state: Mutex<OtpState>,
}

impl OtpController {
    pub fn new(
        api: Arc<dyn AdminApi>,
        store: Arc<dyn SessionStore>,
        view: Arc<dyn OtpView>,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            store,
            view,
            state: Mutex::new(OtpState::default()),
        })
    }

    /// Page entry: start the countdown from its initial value and focus the first cell.
    pub fn mount(self: &Arc<Self>) {
        self.state().countdown = Countdown::new(COUNTDOWN_SECONDS);
        self.start_timer();
        self.focus(0);
    }

    pub fn remaining(&self) -> u32 {
        self.state().countdown.remaining()
    }

    pub fn timer_phase(&self) -> TimerPhase {
        self.state().countdown.phase()
    }

    pub fn ticker_running(&self) -> bool {
        self.state()
            .ticker
            .as_ref()
            .is_some_and(|ticker| !ticker.is_finished())
    }

    pub fn entry(&self) -> OtpEntry {
        self.state().entry.clone()
    }

    pub fn focused_cell(&self) -> Option<usize> {
        self.state().focused
    }

    /// Keystroke on cell `index`. Non-digits are rejected and change nothing.
    pub fn key_press(self: &Arc<Self>, index: usize, key: char) -> bool {
        if index >= OTP_LENGTH {
            return false;
        }
        if !key.is_ascii_digit() {
            debug!(index, "rejected non-digit otp keystroke");
            return false;
        }

        let cell = {
            let mut state = self.state();
            state.entry.set(index, key);
            state.pulsing[index] = true;
            state.cell_view(index)
        };
        self.view.render_cell(index, cell);
        self.schedule_pulse_end(index);

        if index + 1 < OTP_LENGTH {
            self.focus(index + 1);
        }
        true
    }

    /// Cell value removed; focus stays where it is.
    pub fn clear_cell(&self, index: usize) {
        if index >= OTP_LENGTH {
            return;
        }
        let cell = {
            let mut state = self.state();
            state.entry.clear_cell(index);
            state.cell_view(index)
        };
        self.view.render_cell(index, cell);
    }

    /// Backspace on cell `index`: deletes its digit, or steps back when it is already empty.
    pub fn backspace(&self, index: usize) {
        if index >= OTP_LENGTH {
            return;
        }
        let empty = self.state().entry.cell(index).is_none();
        if !empty {
            self.clear_cell(index);
        } else if index > 0 {
            self.focus(index - 1);
        }
    }

    /// Cancels any running tick source, renders the current countdown and restarts ticking.
    pub fn start_timer(self: &Arc<Self>) {
        let countdown = {
            let mut state = self.state();
            let generation = state.retire_ticker();
            state.countdown.start();
            if state.countdown.is_active() {
                state.ticker = self.spawn_ticker(generation);
            }
            state.countdown
        };
        self.render_timer(&countdown);
    }

    /// One countdown step. Returns false once there is nothing left to count.
    pub fn tick(&self) -> bool {
        self.advance(None)
    }

    // A tick from a superseded ticker task is dropped.
    fn advance(&self, generation: Option<u64>) -> bool {
        let countdown = {
            let mut state = self.state();
            if generation.is_some_and(|g| g != state.ticker_generation) {
                return false;
            }
            if !state.countdown.tick() {
                return false;
            }
            if !state.countdown.is_active() {
                // Dropping the handle detaches the task, which exits on its next wakeup.
                state.ticker = None;
                debug!("otp resend countdown expired");
            }
            state.countdown
        };
        self.render_timer(&countdown);
        true
    }

    pub async fn submit(&self) -> VerifyOutcome {
        let otp = self.state().entry.code();
        if otp.len() != OTP_LENGTH {
            FlowError::validation(FlowContext::Verify, format!("otp has {} digits", otp.len()))
                .record();
            self.view.prompt(INCOMPLETE_MESSAGE);
            return VerifyOutcome::Incomplete;
        }

        let Some(pending) = load_pending(self.store.as_ref()) else {
            self.session_lost(FlowContext::Verify);
            return VerifyOutcome::SessionExpired;
        };

        info!(
            email = %mask_sensitive(&pending.email),
            "verifying admin otp"
        );

        match self.api.verify_otp(&VerifyOtpForm::new(&pending, otp)).await {
            Ok(VerifyStatus::Added) => {
                self.view.prompt(REGISTERED_MESSAGE);
                self.store.clear();
                self.leave(Page::Landing);
                VerifyOutcome::Registered
            }
            Ok(VerifyStatus::InvalidOtp) => {
                FlowError::rejected(FlowContext::Verify, "invalid otp").record();
                self.view.prompt(INVALID_OTP_MESSAGE);
                self.reset_cells();
                VerifyOutcome::InvalidOtp
            }
            Ok(VerifyStatus::AdminExists) => {
                FlowError::rejected(FlowContext::Verify, "admin already exists").record();
                self.view.prompt(ADMIN_EXISTS_MESSAGE);
                self.leave(Page::Registration);
                VerifyOutcome::AdminExists
            }
            Ok(VerifyStatus::Other(status)) => {
                FlowError::rejected(FlowContext::Verify, format!("status={status}")).record();
                self.view.prompt(&format!("Unexpected response: {status}"));
                VerifyOutcome::Unexpected(status)
            }
            Err(err) => {
                FlowError::transport(FlowContext::Verify, err.to_string()).record();
                self.view.prompt(VERIFY_NETWORK_MESSAGE);
                VerifyOutcome::NetworkError
            }
        }
    }

    /// Resend action. Guarded on the countdown even when the affordance looks enabled.
    pub async fn resend(self: &Arc<Self>) -> ResendOutcome {
        let remaining = self.remaining();
        if remaining != 0 {
            debug!(remaining, "ignoring resend while countdown is running");
            return ResendOutcome::TimerRunning;
        }

        let Some(pending) = load_pending(self.store.as_ref()) else {
            self.session_lost(FlowContext::Resend);
            return ResendOutcome::SessionExpired;
        };

        info!(
            email = %mask_sensitive(&pending.email),
            "resending admin otp"
        );

        match self.api.send_otp(&OtpRequestForm::from(&pending)).await {
            Ok(OtpSent::Sent) => {
                self.state().countdown = Countdown::new(COUNTDOWN_SECONDS);
                self.start_timer();
                self.view.prompt(RESENT_MESSAGE);
                ResendOutcome::Resent
            }
            Ok(other) => {
                FlowError::rejected(FlowContext::Resend, format!("otp_sent={other:?}")).record();
                self.view.prompt(RESEND_FAILED_MESSAGE);
                ResendOutcome::Failed
            }
            Err(err) => {
                FlowError::transport(FlowContext::Resend, err.to_string()).record();
                self.view.prompt(RESEND_NETWORK_MESSAGE);
                ResendOutcome::NetworkError
            }
        }
    }

    /// Stops the tick source; the page is being left.
    pub fn stop_timer(&self) {
        self.state().retire_ticker();
    }

    fn leave(&self, page: Page) {
        self.stop_timer();
        self.view.navigate(page);
    }

    fn session_lost(&self, context: FlowContext) {
        let failure = FlowError::session(context).record();
        self.view.prompt(SESSION_EXPIRED_MESSAGE);
        if failure.requires_restart() {
            self.leave(Page::Registration);
        }
    }

    fn reset_cells(&self) {
        let cells: Vec<CellView> = {
            let mut state = self.state();
            state.entry.clear();
            state.pulsing = [false; OTP_LENGTH];
            (0..OTP_LENGTH).map(|index| state.cell_view(index)).collect()
        };
        for (index, cell) in cells.into_iter().enumerate() {
            self.view.render_cell(index, cell);
        }
        self.focus(0);
    }

    fn focus(&self, index: usize) {
        self.state().focused = Some(index);
        self.view.focus_cell(index);
    }

    fn render_timer(&self, countdown: &Countdown) {
        self.view.set_timer_text(&countdown.display());
        self.view.set_resend_enabled(countdown.resend_allowed());
    }

    fn spawn_ticker(self: &Arc<Self>, generation: u64) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime; otp countdown will not advance");
            return None;
        };
        let controller = Arc::downgrade(self);
        Some(runtime.spawn(run_ticker(controller, generation)))
    }

    fn schedule_pulse_end(self: &Arc<Self>, index: usize) {
        let Ok(runtime) = Handle::try_current() else {
            self.end_pulse(index);
            return;
        };
        let controller = Arc::downgrade(self);
        runtime.spawn(async move {
            tokio::time::sleep(PULSE_DURATION).await;
            if let Some(controller) = controller.upgrade() {
                controller.end_pulse(index);
            }
        });
    }

    fn end_pulse(&self, index: usize) {
        let cell = {
            let mut state = self.state();
            state.pulsing[index] = false;
            state.cell_view(index)
        };
        self.view.render_cell(index, cell);
    }

    fn state(&self) -> MutexGuard<'_, OtpState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for OtpController {
    fn drop(&mut self) {
        self.state().retire_ticker();
    }
}

async fn run_ticker(controller: Weak<OtpController>, generation: u64) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let Some(controller) = controller.upgrade() else {
            break;
        };
        if !controller.advance(Some(generation))
            || controller.timer_phase() != TimerPhase::Timing
        {
            break;
        }
    }
}

#[cfg(test)]
#[path = "tests/otp_tests.rs"]
mod tests;
