//! Capabilities the controllers need from whatever renders the pages.

use shared::domain::{Field, Page};

pub trait Surface: Send + Sync {
    /// Blocking acknowledgment-style notice.
    fn prompt(&self, message: &str);
    fn navigate(&self, page: Page);
}

pub trait RegistrationView: Surface {
    /// An empty message clears the slot.
    fn set_field_error(&self, field: Field, message: &str);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellView {
    pub value: Option<char>,
    pub filled: bool,
    pub pulse: bool,
}

/// Called with no controller lock held, so implementations may read controller state back.
pub trait OtpView: Surface {
    fn render_cell(&self, index: usize, cell: CellView);
    fn focus_cell(&self, index: usize);
    fn set_timer_text(&self, text: &str);
    fn set_resend_enabled(&self, enabled: bool);
}
