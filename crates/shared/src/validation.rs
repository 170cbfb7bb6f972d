//! Field predicates shared by the registration form. None of them trim or normalize.

use crate::{
    domain::PendingRegistration,
    error::{RegistrationErrors, EMAIL_MESSAGE, NAME_MESSAGE, PASSWORD_MESSAGE},
};

pub const COLLEGE_EMAIL_DOMAIN: &str = "kamarajengg.edu.in";
pub const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];
const PASSWORD_MIN_LEN: usize = 8;
const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 50;

pub fn validate_password(password: &str) -> bool {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return false;
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(&c));
    has_lower && has_upper && has_digit && has_special
}

pub fn validate_college_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || !local.chars().all(is_email_local_char) {
        return false;
    }
    if !is_email_domain(domain) {
        return false;
    }
    domain == COLLEGE_EMAIL_DOMAIN
}

pub fn validate_name(name: &str) -> bool {
    let len = name.chars().count();
    (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len)
        && name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ')
}

/// Runs all three validators against trimmed values without short-circuiting.
pub fn validate_registration(
    email: &str,
    name: &str,
    password: &str,
) -> Result<PendingRegistration, RegistrationErrors> {
    let (email, name, password) = (email.trim(), name.trim(), password.trim());
    let mut errors = RegistrationErrors::default();

    if !validate_college_email(email) {
        errors.email = Some(EMAIL_MESSAGE);
    }
    if !validate_name(name) {
        errors.name = Some(NAME_MESSAGE);
    }
    if !validate_password(password) {
        errors.password = Some(PASSWORD_MESSAGE);
    }

    if errors.is_empty() {
        Ok(PendingRegistration::new(email, name, password))
    } else {
        Err(errors)
    }
}

fn is_email_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}

// `host.tld` where host is [A-Za-z0-9.-]+ and the tld after the last dot is 2+ letters.
fn is_email_domain(domain: &str) -> bool {
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
