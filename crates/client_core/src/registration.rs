use std::sync::Arc;

use shared::{
    domain::{mask_sensitive, Field, Page, PendingRegistration},
    error::RegistrationErrors,
    protocol::{OtpRequestForm, OtpSent},
    validation::validate_registration,
};
use storage::{save_pending, SessionStore};
use tracing::info;

use crate::{
    events::{FlowContext, FlowError},
    view::RegistrationView,
    AdminApi,
};

pub const OTP_SENT_MESSAGE: &str = "OTP sent successfully! Please check your email.";
pub const ADMIN_EXISTS_MESSAGE: &str = "Admin already exists with this email.";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send OTP. Please try again.";
pub const UNEXPECTED_MESSAGE: &str = "Unexpected response from server.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Invalid(RegistrationErrors),
    OtpSent(PendingRegistration),
    AdminExists,
    Failed,
    Unexpected,
    NetworkError,
}

pub struct RegistrationController {
    api: Arc<dyn AdminApi>,
    store: Arc<dyn SessionStore>,
    view: Arc<dyn RegistrationView>,
}

impl RegistrationController {
    pub fn new(
        api: Arc<dyn AdminApi>,
        store: Arc<dyn SessionStore>,
        view: Arc<dyn RegistrationView>,
    ) -> Self {
        Self { api, store, view }
    }

    /// Submit action of the registration form. Never fails; every path ends in a notice.
    pub async fn submit(&self, email: &str, name: &str, password: &str) -> RegisterOutcome {
        for field in Field::ALL {
            self.view.set_field_error(field, "");
        }

        let pending = match validate_registration(email, name, password) {
            Ok(pending) => pending,
            Err(errors) => {
                for field in errors.fields() {
                    if let Some(message) = errors.message(field) {
                        self.view.set_field_error(field, message);
                    }
                }
                FlowError::validation(FlowContext::Register, errors.to_string()).record();
                return RegisterOutcome::Invalid(errors);
            }
        };

        info!(
            email = %mask_sensitive(&pending.email),
            "requesting admin otp"
        );

        match self.api.send_otp(&OtpRequestForm::from(&pending)).await {
            Ok(OtpSent::Sent) => {
                save_pending(self.store.as_ref(), &pending);
                self.view.prompt(OTP_SENT_MESSAGE);
                self.view.navigate(Page::OtpEntry);
                RegisterOutcome::OtpSent(pending)
            }
            Ok(OtpSent::AdminExists) => {
                FlowError::rejected(FlowContext::Register, "admin already exists").record();
                self.view.prompt(ADMIN_EXISTS_MESSAGE);
                RegisterOutcome::AdminExists
            }
            Ok(OtpSent::Failed) => {
                FlowError::rejected(FlowContext::Register, "otp_sent=false").record();
                self.view.prompt(SEND_FAILED_MESSAGE);
                RegisterOutcome::Failed
            }
            Ok(OtpSent::Unexpected(value)) => {
                FlowError::transport(
                    FlowContext::Register,
                    format!("unexpected otp_sent value: {value}"),
                )
                .record();
                self.view.prompt(UNEXPECTED_MESSAGE);
                RegisterOutcome::Unexpected
            }
            Err(err) => {
                FlowError::transport(FlowContext::Register, err.to_string()).record();
                self.view.prompt(NETWORK_MESSAGE);
                RegisterOutcome::NetworkError
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/registration_tests.rs"]
mod tests;
