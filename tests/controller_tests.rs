mod common;

use std::time::Duration;

use leadhook::form::{ContactForm, FormState, SubmitOutcome};
use leadhook::integrations::DispatchError;
use leadhook::models::Field;
use leadhook::settings::IntegrationSettings;

fn fill(form: &mut ContactForm, name: &str, phone: &str, social: &str) {
    assert!(form.edit(Field::Name, name));
    assert!(form.edit(Field::Phone, phone));
    assert!(form.edit(Field::Social, social));
}

// ── Editing ─────────────────────────────────────────────────────

#[test]
fn edits_are_sanitized_and_validated_inline() {
    let mut form = ContactForm::new();
    assert!(!form.can_submit());

    form.edit(Field::Name, "  John123 ");
    assert_eq!(form.input().name, "John123");
    assert!(form.errors().contains_key("name"));
    assert!(!form.errors().contains_key("phone"));

    form.edit(Field::Name, "<Иван>");
    assert_eq!(form.input().name, "Иван");
    assert!(!form.errors().contains_key("name"));
    assert!(!form.can_submit());

    form.edit(Field::Phone, "+7 (999) 123-45-67");
    assert!(form.can_submit());
}

// ── Submission ──────────────────────────────────────────────────

#[tokio::test]
async fn well_formed_lead_is_stored_once_and_posted_to_every_target() {
    let webhook = common::spawn_receiver(200, "ok").await;
    let zapier = common::spawn_receiver(200, "{\"status\":\"success\"}").await;
    let h = common::harness(IntegrationSettings {
        webhook_url: webhook.url("/hook"),
        zapier_webhook_url: zapier.url("/hooks/catch/1/abc"),
        nodul_webhook_url: String::new(),
    });

    let mut form = ContactForm::new();
    fill(&mut form, "Иван", "+79991234567", "@ivan");

    let SubmitOutcome::Accepted(submitted) = form
        .submit(&h.service, "10.0.0.1", Some("https://club.example".to_string()))
        .await
    else {
        panic!("expected lead to be accepted");
    };
    assert_eq!(
        form.state(),
        &FormState::Success {
            lead_id: submitted.record.id
        }
    );

    assert_eq!(submitted.record.id.get_version_num(), 7);

    let records = h.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].course, "male");
    assert_eq!(records[0].social, "@ivan");

    assert_eq!(submitted.deliveries.len(), 2);
    for delivery in submitted.deliveries {
        assert!(delivery.await.unwrap().is_ok());
    }

    for receiver in [&webhook, &zapier] {
        let hits = receiver.hits();
        assert_eq!(hits.len(), 1);
        let body = &hits[0];
        assert_eq!(body["name"], "Иван");
        assert_eq!(body["phone"], "+79991234567");
        assert_eq!(body["social"], "@ivan");
        assert_eq!(body["course"], "male");
        assert_eq!(body["source"], "Leaders Club");
        assert_eq!(body["website"], "https://club.example");
        assert!(body.get("test").is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }
}

#[tokio::test]
async fn formatted_phone_is_stored_normalized() {
    let h = common::harness(IntegrationSettings::default());

    let mut form = ContactForm::new();
    fill(&mut form, "Анна-Мария", "+7 (999) 123-45-67", "");
    assert!(matches!(
        form.submit(&h.service, "", None).await,
        SubmitOutcome::Accepted(_)
    ));

    let records = h.store.records();
    assert_eq!(records[0].phone, "+79991234567");
    assert_eq!(records[0].social, "");
}

#[tokio::test]
async fn failing_target_does_not_block_others_or_success() {
    let broken = common::spawn_receiver(500, "boom").await;
    let healthy = common::spawn_receiver(200, "ok").await;
    let h = common::harness(IntegrationSettings {
        webhook_url: broken.url("/hook"),
        zapier_webhook_url: healthy.url("/hook"),
        nodul_webhook_url: String::new(),
    });

    let mut form = ContactForm::new();
    fill(&mut form, "Иван", "+79991234567", "@ivan");
    let SubmitOutcome::Accepted(submitted) = form.submit(&h.service, "k", None).await else {
        panic!("expected lead to be accepted");
    };

    let mut results = Vec::new();
    for delivery in submitted.deliveries {
        results.push(delivery.await.unwrap());
    }
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(DispatchError::Status {
            status_code: 500,
            ..
        })
    )));
    assert!(matches!(form.state(), FormState::Success { .. }));
    assert_eq!(healthy.hits().len(), 1);
}

#[tokio::test]
async fn invalid_form_is_not_submitted() {
    let h = common::harness(IntegrationSettings::default());

    let mut form = ContactForm::new();
    fill(&mut form, "John123", "+79991234567", "");
    assert!(!form.can_submit());

    let SubmitOutcome::Invalid(errors) = form.submit(&h.service, "k", None).await else {
        panic!("expected validation failure");
    };
    assert!(errors.contains_key("name"));
    assert_eq!(form.state(), &FormState::Editing);
    assert!(h.store.records().is_empty());
}

// ── Store failure ───────────────────────────────────────────────

#[tokio::test]
async fn store_failure_enters_error_and_retry_keeps_values() {
    let receiver = common::spawn_receiver(200, "ok").await;
    let h = common::harness(IntegrationSettings {
        webhook_url: receiver.url("/hook"),
        ..Default::default()
    });
    h.store.set_failing(true);

    let mut form = ContactForm::new();
    fill(&mut form, "Иван", "+79991234567", "@ivan");

    let outcome = form.submit(&h.service, "k", None).await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(matches!(form.state(), FormState::Error { .. }));
    assert!(h.store.records().is_empty());

    // No edits and no second submit while in Error.
    assert!(!form.edit(Field::Name, "Пётр"));
    assert!(matches!(
        form.submit(&h.service, "k", None).await,
        SubmitOutcome::Ignored
    ));

    assert!(form.retry());
    assert_eq!(form.state(), &FormState::Editing);
    assert_eq!(form.input().name, "Иван");
    assert_eq!(form.input().phone, "+79991234567");
    assert_eq!(form.input().social, "@ivan");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(receiver.hits().is_empty());

    h.store.set_failing(false);
    assert!(matches!(
        form.submit(&h.service, "k", None).await,
        SubmitOutcome::Accepted(_)
    ));
    assert_eq!(h.store.records().len(), 1);
}

// ── Throttling ──────────────────────────────────────────────────

#[tokio::test]
async fn fourth_submit_in_window_is_throttled() {
    let h = common::harness(IntegrationSettings::default());
    let mut form = ContactForm::new();

    for _ in 0..3 {
        fill(&mut form, "Иван", "+79991234567", "@ivan");
        assert!(matches!(
            form.submit(&h.service, "k", None).await,
            SubmitOutcome::Accepted(_)
        ));
        assert!(form.reset());
        assert_eq!(form.input().name, "");
    }

    fill(&mut form, "Иван", "+79991234567", "@ivan");
    let SubmitOutcome::Throttled(retry_after) = form.submit(&h.service, "k", None).await else {
        panic!("expected throttling");
    };
    assert!(retry_after <= Duration::from_secs(60));
    assert_eq!(form.state(), &FormState::Editing);
    assert!(form.notice().is_some());
    assert_eq!(h.store.records().len(), 3);

    // Another client is unaffected.
    let mut other = ContactForm::new();
    fill(&mut other, "Анна", "+79990000001", "");
    assert!(matches!(
        other.submit(&h.service, "other", None).await,
        SubmitOutcome::Accepted(_)
    ));

    h.clock.advance(Duration::from_millis(60_001));
    assert!(matches!(
        form.submit(&h.service, "k", None).await,
        SubmitOutcome::Accepted(_)
    ));
}

#[tokio::test]
async fn reset_only_from_success() {
    let h = common::harness(IntegrationSettings::default());
    let mut form = ContactForm::new();
    assert!(!form.reset());
    assert!(!form.retry());

    fill(&mut form, "Иван", "+79991234567", "");
    form.submit(&h.service, "k", None).await;
    assert!(!form.edit(Field::Name, "Пётр"));
    assert!(form.reset());
    assert_eq!(form.state(), &FormState::Editing);
    assert!(form.errors().is_empty());
}
