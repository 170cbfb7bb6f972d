use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use shared::{
    domain::{Field, Page, PendingRegistration},
    protocol::{OtpRequestForm, OtpSent, VerifyOtpForm, VerifyStatus},
};

use crate::{
    view::{CellView, OtpView, RegistrationView, Surface},
    AdminApi, TransportError,
};

pub fn pending() -> PendingRegistration {
    PendingRegistration::new("user.name@kamarajengg.edu.in", "John Doe", "Abcdef1@")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("test lock")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Prompt(String),
    Navigate(Page),
    FieldError(Field, String),
    Cell(usize, CellView),
    Focus(usize),
    Timer(String),
    ResendEnabled(bool),
}

#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        lock(&self.events).clone()
    }

    pub fn reset(&self) {
        lock(&self.events).clear();
    }

    pub fn prompts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Prompt(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<Page> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Navigate(page) => Some(page),
                _ => None,
            })
            .collect()
    }

    pub fn last_timer_text(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Timer(text) => Some(text),
            _ => None,
        })
    }

    pub fn last_resend_enabled(&self) -> Option<bool> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::ResendEnabled(enabled) => Some(enabled),
            _ => None,
        })
    }

    pub fn last_focus(&self) -> Option<usize> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Focus(index) => Some(index),
            _ => None,
        })
    }

    pub fn last_cell(&self, index: usize) -> Option<CellView> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Cell(i, cell) if i == index => Some(cell),
            _ => None,
        })
    }

    pub fn field_errors(&self) -> Vec<(Field, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::FieldError(field, message) if !message.is_empty() => {
                    Some((field, message))
                }
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ViewEvent) {
        lock(&self.events).push(event);
    }
}

impl Surface for RecordingView {
    fn prompt(&self, message: &str) {
        self.push(ViewEvent::Prompt(message.to_string()));
    }

    fn navigate(&self, page: Page) {
        self.push(ViewEvent::Navigate(page));
    }
}

impl RegistrationView for RecordingView {
    fn set_field_error(&self, field: Field, message: &str) {
        self.push(ViewEvent::FieldError(field, message.to_string()));
    }
}

impl OtpView for RecordingView {
    fn render_cell(&self, index: usize, cell: CellView) {
        self.push(ViewEvent::Cell(index, cell));
    }

    fn focus_cell(&self, index: usize) {
        self.push(ViewEvent::Focus(index));
    }

    fn set_timer_text(&self, text: &str) {
        self.push(ViewEvent::Timer(text.to_string()));
    }

    fn set_resend_enabled(&self, enabled: bool) {
        self.push(ViewEvent::ResendEnabled(enabled));
    }
}

/// Replays queued replies and records every form it was handed.
#[derive(Default)]
pub struct ScriptedApi {
    send_replies: Mutex<VecDeque<Result<OtpSent, TransportError>>>,
    verify_replies: Mutex<VecDeque<Result<VerifyStatus, TransportError>>>,
    send_forms: Mutex<Vec<OtpRequestForm>>,
    verify_forms: Mutex<Vec<VerifyOtpForm>>,
}

impl ScriptedApi {
    pub fn with_send(self, reply: Result<OtpSent, TransportError>) -> Self {
        lock(&self.send_replies).push_back(reply);
        self
    }

    pub fn with_verify(self, reply: Result<VerifyStatus, TransportError>) -> Self {
        lock(&self.verify_replies).push_back(reply);
        self
    }

    pub fn send_forms(&self) -> Vec<OtpRequestForm> {
        lock(&self.send_forms).clone()
    }

    pub fn verify_forms(&self) -> Vec<VerifyOtpForm> {
        lock(&self.verify_forms).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.send_forms).len() + lock(&self.verify_forms).len()
    }
}

#[async_trait]
impl AdminApi for ScriptedApi {
    async fn send_otp(&self, form: &OtpRequestForm) -> Result<OtpSent, TransportError> {
        lock(&self.send_forms).push(form.clone());
        lock(&self.send_replies)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted reply".into())))
    }

    async fn verify_otp(&self, form: &VerifyOtpForm) -> Result<VerifyStatus, TransportError> {
        lock(&self.verify_forms).push(form.clone());
        lock(&self.verify_replies)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted reply".into())))
    }
}
