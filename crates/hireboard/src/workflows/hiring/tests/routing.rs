use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::hiring::domain::{ApplicationStatus, Decision};
use crate::workflows::hiring::router::{
    actor_from_headers, hiring_router, ACTOR_COMPANY_HEADER, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER,
};

fn as_seeker(builder: axum::http::request::Builder, user: &str) -> axum::http::request::Builder {
    builder
        .header(ACTOR_ID_HEADER, user)
        .header(ACTOR_ROLE_HEADER, "job_seeker")
}

fn as_hr(builder: axum::http::request::Builder, company: &str) -> axum::http::request::Builder {
    builder
        .header(ACTOR_ID_HEADER, format!("u-hr-{company}"))
        .header(ACTOR_ROLE_HEADER, "hr")
        .header(ACTOR_COMPANY_HEADER, company)
}

#[tokio::test]
async fn apply_route_creates_pending_application() {
    let (service, _, _) = build_service();
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_seeker(
                Request::post("/api/v1/positions/pos-p/applications"),
                "u-e",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!(false));
    assert_eq!(payload["application"]["applying_status"], "PENDING");
    assert_eq!(payload["application"]["employee_id"], "emp-e");
    assert!(payload["message"].as_str().is_some());
}

#[tokio::test]
async fn duplicate_apply_returns_structured_conflict() {
    let (service, _, _) = build_service();
    service.apply(&seeker_e(), &pid("pos-p")).expect("applied");
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_seeker(
                Request::post("/api/v1/positions/pos-p/applications"),
                "u-e",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!(true));
    assert_eq!(payload["code"], "duplicate_application");
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .contains("already applied"));
}

#[tokio::test]
async fn closed_position_message_is_localized() {
    let (service, _, _) = build_service();
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_seeker(
                Request::post("/api/v1/positions/pos-p2/applications"),
                "u-e",
            )
            .header(header::ACCEPT_LANGUAGE, "id-ID,id;q=0.9")
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "position_closed");
    assert_eq!(
        payload["message"],
        "Posisi ini sudah tidak menerima lamaran."
    );
}

#[tokio::test]
async fn missing_identity_is_unauthenticated() {
    let (service, _, _) = build_service();
    let router = hiring_router(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/positions/pos-p/applications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "unauthenticated");
}

#[tokio::test]
async fn transition_route_reports_notification_failure_separately() {
    let (service, store) = build_failing_service();
    let record = service.apply(&seeker_e(), &pid("pos-p")).expect("applied");
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_hr(
                Request::patch(format!("/api/v1/applications/{}/status", record.id.0)),
                ACME,
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({ "status": "ACCEPTED" })).unwrap(),
            ))
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["outcome"], "saved_notification_failed");
    assert_eq!(payload["notification"]["delivered"], json!(false));
    assert_eq!(payload["application"]["applying_status"], "ACCEPTED");
    assert_eq!(stored_status(&store, &record.id), ApplicationStatus::Accepted);
}

#[tokio::test]
async fn transition_route_saves_and_notifies() {
    let (service, _, mail) = build_service();
    let record = service.apply(&seeker_e(), &pid("pos-p")).expect("applied");
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_hr(
                Request::patch(format!("/api/v1/applications/{}/status", record.id.0)),
                ACME,
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({ "status": "REJECTED" })).unwrap(),
            ))
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["outcome"], "saved");
    assert_eq!(payload["notification"]["delivered"], json!(true));
    assert_eq!(mail.sent().len(), 1);
}

#[tokio::test]
async fn transition_route_refuses_pending_as_a_decision() {
    let (service, store, mail) = build_service();
    let record = service.apply(&seeker_e(), &pid("pos-p")).expect("applied");
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_hr(
                Request::patch(format!("/api/v1/applications/{}/status", record.id.0)),
                ACME,
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, "id-ID")
            .body(Body::from(
                serde_json::to_vec(&json!({ "status": "PENDING" })).unwrap(),
            ))
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!(true));
    assert_eq!(payload["code"], "invalid_request");
    assert_eq!(
        payload["message"],
        "Permintaan tidak dapat diproses. Periksa kembali isiannya."
    );
    assert_eq!(stored_status(&store, &record.id), ApplicationStatus::Pending);
    assert!(mail.sent().is_empty());
}

#[tokio::test]
async fn decision_mail_keeps_configured_locale_for_indonesian_reviewers() {
    let (service, _, mail) = build_service();
    let record = service.apply(&seeker_e(), &pid("pos-p")).expect("applied");
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_hr(
                Request::patch(format!("/api/v1/applications/{}/status", record.id.0)),
                ACME,
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, "id")
            .body(Body::from(
                serde_json::to_vec(&json!({ "status": "ACCEPTED" })).unwrap(),
            ))
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["message"],
        "Status lamaran diperbarui dan pelamar telah diberi tahu."
    );
    let sent = mail.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("accepted"));
}

#[tokio::test]
async fn list_route_refuses_unknown_status_filter() {
    let (service, _, _) = build_service();
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_hr(Request::get("/api/v1/applications?status=HIRED"), ACME)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "invalid_request");
    assert_eq!(
        payload["message"],
        "The request could not be understood. Check its fields."
    );
}

#[tokio::test]
async fn delete_route_refuses_job_seekers() {
    let (service, store, _) = build_service();
    let record = service.apply(&seeker_e(), &pid("pos-p")).expect("applied");
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_seeker(
                Request::delete(format!("/api/v1/applications/{}", record.id.0)),
                "u-e",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.application_count(), 1);
}

#[tokio::test]
async fn list_route_scopes_hr_to_their_company() {
    let (service, _, _) = build_service();
    service.apply(&seeker_e(), &pid("pos-p")).expect("applied");
    service.apply(&seeker_f(), &pid("pos-r")).expect("applied");
    let accepted = service.apply(&seeker_f(), &pid("pos-q")).expect("applied");
    service
        .transition(&hr_acme(), &accepted.id, Decision::Accepted)
        .expect("accepted");
    let router = hiring_router(service);

    let response = router
        .oneshot(
            as_hr(Request::get("/api/v1/applications?status=PENDING"), ACME)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("array body");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["position_id"], "pos-p");
}

#[tokio::test]
async fn positions_route_lists_open_postings_without_identity() {
    let (service, _, _) = build_service();
    let router = hiring_router(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/positions?status=OPEN&company_id=acme")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("array body");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["status"] == "OPEN"));
}

#[tokio::test]
async fn store_outage_hides_details_behind_generic_message() {
    let router = hiring_router(unavailable_service());

    let response = router
        .oneshot(
            as_seeker(
                Request::post("/api/v1/positions/pos-p/applications"),
                "u-e",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], "internal");
    let message = payload["message"].as_str().expect("message");
    assert!(!message.contains("database offline"));
}

#[test]
fn hr_identity_requires_a_company_header() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(ACTOR_ID_HEADER, "u-hr".parse().unwrap());
    headers.insert(ACTOR_ROLE_HEADER, "hr".parse().unwrap());
    assert!(actor_from_headers(&headers).is_none());

    headers.insert(ACTOR_COMPANY_HEADER, ACME.parse().unwrap());
    let actor = actor_from_headers(&headers).expect("hr resolves");
    assert!(actor.can_review_for(&crate::workflows::hiring::CompanyId(ACME.to_string())));
}
