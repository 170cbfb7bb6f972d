//! Failure taxonomy for the registration and OTP flows.

use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowErrorCategory {
    /// Local field or OTP-length check failed; no request was made.
    Validation,
    /// The admin service answered but refused the action.
    Rejected,
    /// Request failed, timed out or came back malformed.
    Transport,
    /// Pending registration is missing from session storage.
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowContext {
    Register,
    Verify,
    Resend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowError {
    category: FlowErrorCategory,
    context: FlowContext,
    message: String,
}

impl FlowError {
    pub fn new(
        category: FlowErrorCategory,
        context: FlowContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn validation(context: FlowContext, message: impl Into<String>) -> Self {
        Self::new(FlowErrorCategory::Validation, context, message)
    }

    pub fn rejected(context: FlowContext, message: impl Into<String>) -> Self {
        Self::new(FlowErrorCategory::Rejected, context, message)
    }

    pub fn transport(context: FlowContext, message: impl Into<String>) -> Self {
        Self::new(FlowErrorCategory::Transport, context, message)
    }

    pub fn session(context: FlowContext) -> Self {
        Self::new(
            FlowErrorCategory::Session,
            context,
            "pending registration missing from session storage",
        )
    }

    /// A lost session sends the user back to the registration step, except on resend.
    pub fn requires_restart(&self) -> bool {
        self.category == FlowErrorCategory::Session && self.context != FlowContext::Resend
    }

    /// Emits the diagnostic record for this failure and hands it back.
    pub fn record(self) -> Self {
        match self.category {
            FlowErrorCategory::Transport => error!(
                context = ?self.context,
                category = ?self.category,
                detail = %self.message,
                "admin flow failure"
            ),
            _ => warn!(
                context = ?self.context,
                category = ?self.category,
                detail = %self.message,
                "admin flow failure"
            ),
        }
        self
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
