use std::sync::Arc;

use serde_json::json;
use shared::error::{EMAIL_MESSAGE, NAME_MESSAGE, PASSWORD_MESSAGE};
use storage::{load_pending, MemorySessionStore, ADMIN_EMAIL_KEY};

use super::*;
use crate::{
    test_support::{pending, RecordingView, ScriptedApi, ViewEvent},
    TransportError,
};

struct Harness {
    controller: RegistrationController,
    api: Arc<ScriptedApi>,
    store: Arc<MemorySessionStore>,
    view: Arc<RecordingView>,
}

fn harness(api: ScriptedApi) -> Harness {
    let api = Arc::new(api);
    let store = Arc::new(MemorySessionStore::new());
    let view = Arc::new(RecordingView::default());
    let controller = RegistrationController::new(api.clone(), store.clone(), view.clone());
    Harness {
        controller,
        api,
        store,
        view,
    }
}

#[tokio::test]
async fn valid_form_sends_trimmed_fields_and_moves_to_otp_page() {
    let h = harness(ScriptedApi::default().with_send(Ok(OtpSent::Sent)));

    let outcome = h
        .controller
        .submit(" user.name@kamarajengg.edu.in ", "  John Doe ", "Abcdef1@ ")
        .await;

    assert_eq!(outcome, RegisterOutcome::OtpSent(pending()));
    assert_eq!(h.api.send_forms(), vec![OtpRequestForm::from(&pending())]);
    assert_eq!(load_pending(h.store.as_ref()), Some(pending()));
    assert_eq!(h.view.navigations(), vec![Page::OtpEntry]);
    assert_eq!(h.view.prompts(), vec![OTP_SENT_MESSAGE.to_string()]);
    assert!(h.view.field_errors().is_empty());
}

#[tokio::test]
async fn invalid_form_sets_every_message_and_makes_no_request() {
    let h = harness(ScriptedApi::default());

    let outcome = h.controller.submit("user@gmail.com", "John3", "weak").await;

    assert!(matches!(outcome, RegisterOutcome::Invalid(_)));
    assert_eq!(h.api.calls(), 0);
    assert_eq!(
        h.view.field_errors(),
        vec![
            (Field::Email, EMAIL_MESSAGE.to_string()),
            (Field::Name, NAME_MESSAGE.to_string()),
            (Field::Password, PASSWORD_MESSAGE.to_string()),
        ]
    );
    assert!(h.view.prompts().is_empty());
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn resubmitting_clears_previous_messages_first() {
    let h = harness(ScriptedApi::default().with_send(Ok(OtpSent::Sent)));
    h.controller.submit("bad", "John Doe", "Abcdef1@").await;
    h.view.reset();

    h.controller
        .submit("user.name@kamarajengg.edu.in", "John Doe", "Abcdef1@")
        .await;

    let events = h.view.events();
    assert_eq!(
        &events[..3],
        &[
            ViewEvent::FieldError(Field::Email, String::new()),
            ViewEvent::FieldError(Field::Name, String::new()),
            ViewEvent::FieldError(Field::Password, String::new()),
        ]
    );
}

#[tokio::test]
async fn existing_admin_stays_on_page_without_storing() {
    let h = harness(ScriptedApi::default().with_send(Ok(OtpSent::AdminExists)));

    let outcome = h
        .controller
        .submit("user.name@kamarajengg.edu.in", "John Doe", "Abcdef1@")
        .await;

    assert_eq!(outcome, RegisterOutcome::AdminExists);
    assert_eq!(h.view.prompts(), vec![ADMIN_EXISTS_MESSAGE.to_string()]);
    assert!(h.view.navigations().is_empty());
    assert_eq!(h.store.get(ADMIN_EMAIL_KEY), None);
}

#[tokio::test]
async fn explicit_failure_and_unexpected_reply_stay_on_page() {
    let h = harness(
        ScriptedApi::default()
            .with_send(Ok(OtpSent::Failed))
            .with_send(Ok(OtpSent::Unexpected(json!("maybe")))),
    );

    let first = h
        .controller
        .submit("user.name@kamarajengg.edu.in", "John Doe", "Abcdef1@")
        .await;
    let second = h
        .controller
        .submit("user.name@kamarajengg.edu.in", "John Doe", "Abcdef1@")
        .await;

    assert_eq!(first, RegisterOutcome::Failed);
    assert_eq!(second, RegisterOutcome::Unexpected);
    assert_eq!(
        h.view.prompts(),
        vec![
            SEND_FAILED_MESSAGE.to_string(),
            UNEXPECTED_MESSAGE.to_string()
        ]
    );
    assert!(h.view.navigations().is_empty());
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn transport_failure_becomes_network_notice() {
    let h = harness(
        ScriptedApi::default().with_send(Err(TransportError::Decode("not json".into()))),
    );

    let outcome = h
        .controller
        .submit("user.name@kamarajengg.edu.in", "John Doe", "Abcdef1@")
        .await;

    assert_eq!(outcome, RegisterOutcome::NetworkError);
    assert_eq!(h.view.prompts(), vec![NETWORK_MESSAGE.to_string()]);
    assert!(h.store.is_empty());
}
