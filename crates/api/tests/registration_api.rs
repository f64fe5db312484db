//! HTTP-level tests for the registration lifecycle under `/inscription`.

mod common;

use axum::http::StatusCode;
use common::{
    accepted_event, body_json, delete, delete_json, get, manager, participant, post_json,
    post_multipart, put, put_json, register_via_api, token, Part,
};
use eventhub_events::NotificationKind;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn free_event_fills_up_and_confirms_without_payment(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let first = participant(&pool, "first@example.com").await;
    let second = participant(&pool, "second@example.com").await;
    let event = accepted_event(&pool, &organizer, 1, 0).await;

    let registration_id = register_via_api(test.app(), &first, event.id).await;

    let response = post_json(
        test.app(),
        "/api/v1/inscription/creeinscription",
        &token(&second),
        serde_json::json!({ "event_id": event.id, "phone": "0601020304" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Capacity exceeded: the event is full");

    let response = get(
        test.app(),
        "/api/v1/inscription/getparticipant",
        Some(&token(&second)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], serde_json::json!([]));

    let response = put(
        test.app(),
        &format!("/api/v1/inscription/valider/{registration_id}"),
        &token(&organizer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "confirmed");
    assert!(json["data"]["validated_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_registrations_cannot_overfill_the_last_seat(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let bob = participant(&pool, "bob@example.com").await;
    let event = accepted_event(&pool, &organizer, 1, 0).await;
    let body = serde_json::json!({ "event_id": event.id, "phone": "0601020304" });
    let (alice_token, bob_token) = (token(&alice), token(&bob));

    let (first, second) = tokio::join!(
        post_json(
            test.app(),
            "/api/v1/inscription/creeinscription",
            &alice_token,
            body.clone(),
        ),
        post_json(
            test.app(),
            "/api/v1/inscription/creeinscription",
            &bob_token,
            body.clone(),
        )
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let (seats,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
            .bind(event.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(seats, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn registration_snapshots_contact_details(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;

    let response = post_json(
        test.app(),
        "/api/v1/inscription/creeinscription",
        &token(&alice),
        serde_json::json!({
            "event_id": event.id,
            "phone": "  0611223344 ",
            "display_name": "Alice Martin",
            "note": "Vegetarian"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Registration created");
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["display_name"], "Alice Martin");
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["phone"], "0611223344");
    assert_eq!(json["data"]["note"], "Vegetarian");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_registration_returns_409(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;

    register_via_api(test.app(), &alice, event.id).await;
    let response = post_json(
        test.app(),
        "/api/v1/inscription/creeinscription",
        &token(&alice),
        serde_json::json!({ "event_id": event.id, "phone": "0601020304" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You are already registered for this event");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_phone_returns_400(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;

    let response = post_json(
        test.app(),
        "/api/v1/inscription/creeinscription",
        &token(&alice),
        serde_json::json!({ "event_id": event.id, "phone": "   " }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "A phone number is required");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_event_returns_404(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let alice = participant(&pool, "alice@example.com").await;

    let response = post_json(
        test.app(),
        "/api/v1/inscription/creeinscription",
        &token(&alice),
        serde_json::json!({ "event_id": 999_999, "phone": "0601020304" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn registration_publishes_notification(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let mut notifications = test.bus.subscribe();
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;

    let registration_id = register_via_api(test.app(), &alice, event.id).await;

    let notification = notifications.try_recv().expect("notification published");
    assert_eq!(notification.kind, NotificationKind::RegistrationReceived);
    assert_eq!(notification.recipient_email, "alice@example.com");
    assert_eq!(notification.registration_id, Some(registration_id));
}

// ---------------------------------------------------------------------------
// Payment gate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn priced_event_requires_approved_payment(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 2000).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;
    let confirm_uri = format!("/api/v1/inscription/valider/{registration_id}");

    let response = put(test.app(), &confirm_uri, &token(&organizer)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "No payment found for this registration"
    );

    let id_text = registration_id.to_string();
    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&alice),
        &[
            Part::Text("registration_id", &id_text),
            Part::Text("payment_method", "bank_transfer"),
            Part::File {
                name: "proof",
                file_name: "receipt.pdf",
                content_type: "application/pdf",
                data: b"%PDF-1.4 receipt",
            },
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment = body_json(response).await;
    let payment_id = payment["data"]["id"].as_i64().unwrap();
    assert_eq!(payment["data"]["amount_cents"], 2000);

    let response = put(test.app(), &confirm_uri, &token(&organizer)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "The payment is not yet validated; the registration cannot be validated"
    );

    let response = put_json(
        test.app(),
        &format!("/api/v1/payment/valider/{payment_id}"),
        &token(&organizer),
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put(test.app(), &confirm_uri, &token(&organizer)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let confirmed = body_json(response).await;
    assert_eq!(confirmed["data"]["status"], "confirmed");
    let validated_at = confirmed["data"]["validated_at"].clone();
    assert!(validated_at.is_string());

    let response = put(test.app(), &confirm_uri, &token(&organizer)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "This registration is already validated"
    );

    let response = get(
        test.app(),
        &format!("/api/v1/inscription/{registration_id}"),
        Some(&token(&organizer)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "confirmed");
    assert_eq!(json["data"]["validated_at"], validated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_payment_blocks_confirmation(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 1500).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;

    let id_text = registration_id.to_string();
    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&alice),
        &[
            Part::Text("registration_id", &id_text),
            Part::Text("payment_method", "cash"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json(
        test.app(),
        &format!("/api/v1/payment/valider/{payment_id}"),
        &token(&organizer),
        serde_json::json!({ "status": "rejected" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put(
        test.app(),
        &format!("/api/v1/inscription/valider/{registration_id}"),
        &token(&organizer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "The payment for this registration was rejected");

    let response = get(
        test.app(),
        &format!("/api/v1/inscription/{registration_id}"),
        Some(&token(&alice)),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["status"], "pending");
}

// ---------------------------------------------------------------------------
// Cancellation and deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_registration_frees_the_seat(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let bob = participant(&pool, "bob@example.com").await;
    let event = accepted_event(&pool, &organizer, 1, 0).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;

    let response = put(
        test.app(),
        &format!("/api/v1/inscription/annulee/{registration_id}"),
        &token(&alice),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "cancelled");

    register_via_api(test.app(), &bob, event.id).await;

    let response = put(
        test.app(),
        &format!("/api/v1/inscription/annulee/{registration_id}"),
        &token(&organizer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn participant_deletes_pending_registration(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;

    let response = delete(
        test.app(),
        &format!("/api/v1/inscription/annuleeinscription/{registration_id}"),
        &token(&alice),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json.get("data").is_none());

    let response = get(
        test.app(),
        &format!("/api/v1/inscription/{registration_id}"),
        Some(&token(&alice)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn participant_cannot_delete_confirmed_registration(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;

    let response = put(
        test.app(),
        &format!("/api/v1/inscription/valider/{registration_id}"),
        &token(&organizer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete(
        test.app(),
        &format!("/api/v1/inscription/annuleeinscription/{registration_id}"),
        &token(&alice),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn participant_cannot_delete_someone_elses_registration(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let mallory = participant(&pool, "mallory@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;

    let response = delete(
        test.app(),
        &format!("/api/v1/inscription/annuleeinscription/{registration_id}"),
        &token(&mallory),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Manager removal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_removes_registration_with_reason(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let mut notifications = test.bus.subscribe();
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;
    let uri = format!("/api/v1/inscription/deleteinscription/{registration_id}");

    let response = delete_json(
        test.app(),
        &uri,
        &token(&organizer),
        serde_json::json!({ "reason": "not_a_reason" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete(test.app(), &uri, &token(&organizer)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_json(
        test.app(),
        &uri,
        &token(&organizer),
        serde_json::json!({ "reason": "payment_not_received" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["reason"], "payment_not_received");
    assert_eq!(json["data"]["reason_label"], "Payment not received");

    let removed = std::iter::from_fn(|| notifications.try_recv().ok())
        .find(|n| n.kind == NotificationKind::RegistrationRemoved)
        .expect("removal notification");
    assert_eq!(removed.reason.as_deref(), Some("Payment not received"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_cannot_act_on_another_organizers_event(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let other = manager(&pool, "other@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await;

    let response = put(
        test.app(),
        &format!("/api/v1/inscription/valider/{registration_id}"),
        &token(&other),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_json(
        test.app(),
        &format!("/api/v1/inscription/deleteinscription/{registration_id}"),
        &token(&other),
        serde_json::json!({ "reason": "other" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn listings_are_scoped_to_caller(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let other = manager(&pool, "other@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let bob = participant(&pool, "bob@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 0).await;
    let other_event = accepted_event(&pool, &other, 10, 0).await;
    register_via_api(test.app(), &alice, event.id).await;
    register_via_api(test.app(), &bob, other_event.id).await;

    let response = get(test.app(), "/api/v1/inscription/get", Some(&token(&organizer))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["participant"]["email"], "alice@example.com");
    assert_eq!(items[0]["event"]["id"], event.id);
    assert!(items[0]["payment"].is_null());

    let response = get(
        test.app(),
        "/api/v1/inscription/getparticipant",
        Some(&token(&bob)),
    )
    .await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["event"]["id"], other_event.id);
}
