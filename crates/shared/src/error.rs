use thiserror::Error;

use crate::domain::Field;

pub const EMAIL_MESSAGE: &str = "Invalid college email (must end with @kamarajengg.edu.in)";
pub const NAME_MESSAGE: &str = "Name must contain only letters and spaces (2–50 chars)";
pub const PASSWORD_MESSAGE: &str =
    "Password must be ≥8 chars with upper, lower, number & special (@$!%*?&)";

/// Per-field validation failures of one registration attempt. Several may be set at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error(
    "registration form rejected: {}",
    field_list(.email.is_some(), .name.is_some(), .password.is_some())
)]
pub struct RegistrationErrors {
    pub email: Option<&'static str>,
    pub name: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl RegistrationErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password.is_none()
    }

    pub fn message(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::Email => self.email,
            Field::Name => self.name,
            Field::Password => self.password,
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.message(*field).is_some())
            .collect()
    }
}

fn field_list(email: bool, name: bool, password: bool) -> String {
    [(email, "email"), (name, "name"), (password, "password")]
        .into_iter()
        .filter_map(|(failed, label)| failed.then_some(label))
        .collect::<Vec<_>>()
        .join(", ")
}
