//! HTTP-level tests for payment submission and review under `/payment`.

mod common;

use axum::http::StatusCode;
use common::{
    accepted_event, body_json, get, manager, participant, post_multipart, put, put_json,
    register_via_api, send, token, Part,
};
use eventhub_events::NotificationKind;
use sqlx::PgPool;

fn receipt<'a>() -> Part<'a> {
    Part::File {
        name: "proof",
        file_name: "receipt.png",
        content_type: "image/png",
        data: b"\x89PNG fake image bytes",
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bank_transfer_without_proof_returns_400(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 1500).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await.to_string();

    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&alice),
        &[
            Part::Text("registration_id", &registration_id),
            Part::Text("payment_method", "bank_transfer"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "A proof of payment is required for bank_transfer");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cash_payment_needs_no_proof_and_gets_reference(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 1500).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await.to_string();

    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&alice),
        &[
            Part::Text("registration_id", &registration_id),
            Part::Text("payment_method", "cash"),
            Part::Text("remark", "Paid at the desk"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["status"], "pending");
    assert_eq!(data["payment_method"], "cash");
    assert_eq!(data["remark"], "Paid at the desk");
    assert!(data["proof_path"].is_null());
    assert!(data["reference"].as_str().unwrap().starts_with("PAY-"));
    assert_eq!(data["email"], "alice@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_payment_for_same_event_returns_409(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 1500).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await.to_string();
    let parts = [
        Part::Text("registration_id", &registration_id),
        Part::Text("payment_method", "mobile_money"),
    ];

    let first = post_multipart(test.app(), "/api/v1/payment/create", &token(&alice), &parts).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_multipart(test.app(), "/api/v1/payment/create", &token(&alice), &parts).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(second).await["message"],
        "A payment was already submitted for this event"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_method_and_foreign_registration_are_rejected(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let mallory = participant(&pool, "mallory@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 1500).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await.to_string();

    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&alice),
        &[
            Part::Text("registration_id", &registration_id),
            Part::Text("payment_method", "cheque"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&mallory),
        &[
            Part::Text("registration_id", &registration_id),
            Part::Text("payment_method", "cash"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&alice),
        &[Part::Text("payment_method", "cash")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unsupported_proof_type_is_rejected_and_nothing_is_stored(pool: PgPool) {
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
            Part::Text("payment_method", "bank_transfer"),
            Part::File {
                name: "proof",
                file_name: "receipt.exe",
                content_type: "application/octet-stream",
                data: b"MZ",
            },
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(
        test.app(),
        &format!("/api/v1/payment/get/{registration_id}"),
        Some(&token(&organizer)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stored_proof_is_served_under_uploads(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let alice = participant(&pool, "alice@example.com").await;
    let event = accepted_event(&pool, &organizer, 10, 1500).await;
    let registration_id = register_via_api(test.app(), &alice, event.id).await.to_string();

    let response = post_multipart(
        test.app(),
        "/api/v1/payment/create",
        &token(&alice),
        &[
            Part::Text("registration_id", &registration_id),
            Part::Text("payment_method", "bank_transfer"),
            receipt(),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let proof_path = json["data"]["proof_path"].as_str().unwrap().to_string();
    assert!(proof_path.starts_with("/uploads/proofs/"));
    assert!(proof_path.ends_with(".png"));

    let request = axum::http::Request::builder()
        .uri(&proof_path)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(test.app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_reviews_payment_and_participant_is_notified(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let mut notifications = test.bus.subscribe();
    let organizer = manager(&pool, "org@example.com").await;
    let other = manager(&pool, "other@example.com").await;
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
            Part::Text("payment_method", "bank_transfer"),
            receipt(),
        ],
    )
    .await;
    let payment = body_json(response).await;
    let payment_id = payment["data"]["id"].as_i64().unwrap();
    let reference = payment["data"]["reference"].as_str().unwrap().to_string();
    let review_uri = format!("/api/v1/payment/valider/{payment_id}");

    let response = put_json(
        test.app(),
        &review_uri,
        &token(&other),
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json(
        test.app(),
        &review_uri,
        &token(&organizer),
        serde_json::json!({ "status": "maybe" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        test.app(),
        &review_uri,
        &token(&organizer),
        serde_json::json!({ "status": "rejected" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Payment rejected");
    assert_eq!(json["data"]["status"], "rejected");
    assert!(json["data"]["reviewed_at"].is_string());

    let rejected = std::iter::from_fn(|| notifications.try_recv().ok())
        .find(|n| n.kind == NotificationKind::PaymentRejected)
        .expect("rejection notification");
    assert_eq!(rejected.reference.as_deref(), Some(reference.as_str()));

    let response = put(
        test.app(),
        &format!("/api/v1/inscription/valider/{registration_id}"),
        &token(&organizer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "The payment for this registration was rejected"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_lists_payments_for_own_events(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let organizer = manager(&pool, "org@example.com").await;
    let other = manager(&pool, "other@example.com").await;
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

    let response = get(test.app(), "/api/v1/payment/get", Some(&token(&organizer))).await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["event_title"], "Rust workshop");
    assert_eq!(items[0]["registration_id"], registration_id);

    let response = get(test.app(), "/api/v1/payment/get", Some(&token(&other))).await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = get(
        test.app(),
        &format!("/api/v1/payment/get/{registration_id}"),
        Some(&token(&organizer)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["payment_method"], "cash");
}
