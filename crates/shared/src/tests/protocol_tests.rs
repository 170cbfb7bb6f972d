use serde_json::json;

use super::*;
use crate::domain::mask_sensitive;

#[test]
fn otp_sent_accepts_the_mixed_value_set() {
    assert_eq!(OtpSent::from_body(&json!({ "otp_sent": true })), OtpSent::Sent);
    assert_eq!(
        OtpSent::from_body(&json!({ "otp_sent": false })),
        OtpSent::Failed
    );
    assert_eq!(
        OtpSent::from_body(&json!({ "otp_sent": "Admin already exists" })),
        OtpSent::AdminExists
    );
}

#[test]
fn otp_sent_treats_anything_else_as_unexpected() {
    assert_eq!(
        OtpSent::from_body(&json!({ "otp_sent": "true" })),
        OtpSent::Unexpected(json!("true"))
    );
    assert_eq!(
        OtpSent::from_body(&json!({ "otp_sent": 1 })),
        OtpSent::Unexpected(json!(1))
    );
    assert_eq!(
        OtpSent::from_body(&json!({ "status": "ok" })),
        OtpSent::Unexpected(Value::Null)
    );
    assert_eq!(
        OtpSent::from_body(&json!(["otp_sent"])),
        OtpSent::Unexpected(Value::Null)
    );
}

#[test]
fn verify_status_maps_known_strings() {
    assert_eq!(
        VerifyStatus::from_body(&json!({ "status": "successfully added admin" })),
        VerifyStatus::Added
    );
    assert_eq!(
        VerifyStatus::from_body(&json!({ "status": "invalid otp" })),
        VerifyStatus::InvalidOtp
    );
    assert_eq!(
        VerifyStatus::from_body(&json!({ "status": "Admin already exists" })),
        VerifyStatus::AdminExists
    );
}

#[test]
fn verify_status_keeps_raw_value_for_unknown_replies() {
    assert_eq!(
        VerifyStatus::from_body(&json!({ "status": "otp expired" })),
        VerifyStatus::Other("otp expired".to_string())
    );
    assert_eq!(
        VerifyStatus::from_body(&json!({ "status": 500 })),
        VerifyStatus::Other("500".to_string())
    );
    assert_eq!(
        VerifyStatus::from_body(&json!({})),
        VerifyStatus::Other("undefined".to_string())
    );
}

#[test]
fn verify_form_encodes_in_field_order() {
    let pending = PendingRegistration::new("a@kamarajengg.edu.in", "Ann Lee", "Abcdef1@");
    let form = VerifyOtpForm::new(&pending, "012345");
    let encoded = serde_json::to_value(&form).expect("serialize");

    assert_eq!(
        encoded,
        json!({
            "email": "a@kamarajengg.edu.in",
            "name": "Ann Lee",
            "password": "Abcdef1@",
            "otp": "012345",
        })
    );
}

#[test]
fn masks_sensitive_values_for_logs() {
    assert_eq!(mask_sensitive("user@kamarajengg.edu.in"), "us***in");
    assert_eq!(mask_sensitive("key"), "***");
    assert_eq!(mask_sensitive(""), "");
}
