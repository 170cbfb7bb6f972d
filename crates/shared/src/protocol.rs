//! Form bodies and JSON replies of the OTP issuance and verification endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::PendingRegistration;

pub const ADMIN_EXISTS: &str = "Admin already exists";
pub const STATUS_ADDED: &str = "successfully added admin";
pub const STATUS_INVALID_OTP: &str = "invalid otp";

/// Body of the issuance request: `email=..&name=..&password=..`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpRequestForm {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl From<&PendingRegistration> for OtpRequestForm {
    fn from(pending: &PendingRegistration) -> Self {
        Self {
            email: pending.email.clone(),
            name: pending.name.clone(),
            password: pending.password.clone(),
        }
    }
}

/// Body of the verification request; field order matches the issuance form plus `otp`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyOtpForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub otp: String,
}

impl VerifyOtpForm {
    pub fn new(pending: &PendingRegistration, otp: impl Into<String>) -> Self {
        Self {
            email: pending.email.clone(),
            name: pending.name.clone(),
            password: pending.password.clone(),
            otp: otp.into(),
        }
    }
}

/// Decoded `otp_sent` field. The service mixes a boolean with a conflict string here;
/// the accepted value set is reproduced as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum OtpSent {
    Sent,
    AdminExists,
    Failed,
    Unexpected(Value),
}

impl OtpSent {
    pub fn from_body(body: &Value) -> Self {
        match body.get("otp_sent") {
            Some(Value::Bool(true)) => OtpSent::Sent,
            Some(Value::Bool(false)) => OtpSent::Failed,
            Some(Value::String(s)) if s == ADMIN_EXISTS => OtpSent::AdminExists,
            Some(other) => OtpSent::Unexpected(other.clone()),
            None => OtpSent::Unexpected(Value::Null),
        }
    }
}

/// Decoded `status` field of the verification reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    Added,
    InvalidOtp,
    AdminExists,
    Other(String),
}

impl VerifyStatus {
    pub fn from_body(body: &Value) -> Self {
        match body.get("status") {
            Some(Value::String(s)) if s == STATUS_ADDED => VerifyStatus::Added,
            Some(Value::String(s)) if s == STATUS_INVALID_OTP => VerifyStatus::InvalidOtp,
            Some(Value::String(s)) if s == ADMIN_EXISTS => VerifyStatus::AdminExists,
            Some(Value::String(s)) => VerifyStatus::Other(s.clone()),
            Some(other) => VerifyStatus::Other(other.to_string()),
            None => VerifyStatus::Other("undefined".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
