/// Identity captured by the registration form and carried to the OTP page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl PendingRegistration {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
        }
    }

    /// All three fields must be non-empty before any OTP action runs.
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.name.is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Email,
    Name,
    Password,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Email, Field::Name, Field::Password];
}

/// Opaque navigation targets of the two-page flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Registration,
    OtpEntry,
    Landing,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Registration => "templates/registerform.html",
            Page::OtpEntry => "templates/otpverify.html",
            Page::Landing => "templates/index.html",
        }
    }
}

/// Masks a value for diagnostics, keeping only the first and last two characters.
pub fn mask_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}
