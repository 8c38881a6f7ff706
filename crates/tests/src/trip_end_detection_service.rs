/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::sync::Arc;

use actix_web::{
    http::{header::CONTENT_LENGTH, StatusCode},
    test, web, App, ResponseError,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use trip_end_detection_service::{
    common::{
        history::{HistoryStore, InMemoryHistoryStore},
        notifier::InMemoryTripEndNotifier,
        types::*,
    },
    domain::{api, types::ui::location::*},
    environment::AppState,
    middleware::*,
    tools::error::{AppError, ErrorBody},
};

const ORIGIN_LAT: f64 = 12.9716;
const ORIGIN_LON: f64 = 77.5946;
const SESSION_ID: &str = "session-1";

struct TestContext {
    data: web::Data<AppState>,
    store: Arc<InMemoryHistoryStore>,
    notifier: Arc<InMemoryTripEndNotifier>,
}

fn test_context() -> TestContext {
    let store = Arc::new(InMemoryHistoryStore::new(3600));
    let notifier = Arc::new(InMemoryTripEndNotifier::new());
    let app_state = AppState::with_collaborators(
        store.clone(),
        notifier.clone(),
        TripEndThresholds::default(),
    )
    .expect("default thresholds are valid");

    TestContext {
        data: web::Data::new(app_state),
        store,
        notifier,
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _| AppError::UnprocessibleRequest(err.to_string()).into())
}

macro_rules! test_app {
    ($data:expr) => {
        test::init_service(
            App::new()
                .app_data($data.clone())
                .app_data(json_config())
                .wrap(CheckContentLength)
                .wrap(RequestTimeout)
                .wrap(IncomingRequestMetrics)
                .configure(api::handler),
        )
        .await
    };
}

/// A location changed event `meters_north` of the origin, captured `age_secs` ago.
fn location_changed(meters_north: f64, acc: f64, age_secs: i64) -> Value {
    json!({
        "type": "LOCATION_CHANGED",
        "pt": {
            "lat": ORIGIN_LAT + meters_north / 111_195.0,
            "lon": ORIGIN_LON,
        },
        "acc": acc,
        "ts": (Utc::now() - Duration::seconds(age_secs)).to_rfc3339(),
    })
}

fn location_uri(session_id: &str) -> String {
    format!("/ui/session/{session_id}/location")
}

#[actix_web::test]
async fn stationary_session_ends_trip_and_notifies_once() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let events: Vec<Value> = (0..10)
        .map(|i| location_changed(i as f64, 5.0, 20 - i))
        .collect();

    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(&events)
        .to_request();
    let resp: LocationUpdateResponse = test::call_and_read_body_json(&app, req).await;

    let mut expected = vec![SampleOutcome::Admitted; 9];
    expected.push(SampleOutcome::TripEnded);
    assert_eq!(resp.outcomes, expected);
    assert!(resp.trip_ended);

    let notified = ctx.notifier.events().await;
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].s_id, SessionId(SESSION_ID.to_string()));
}

#[actix_web::test]
async fn every_stationary_evaluation_notifies_again() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let events: Vec<Value> = (0..10)
        .map(|i| location_changed(i as f64, 5.0, 30 - i))
        .collect();
    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(&events)
        .to_request();
    let _: LocationUpdateResponse = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(vec![location_changed(12.0, 5.0, 1)])
        .to_request();
    let resp: LocationUpdateResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.outcomes, vec![SampleOutcome::TripEnded]);
    assert_eq!(ctx.notifier.events().await.len(), 2);
}

#[actix_web::test]
async fn moving_session_never_ends_trip() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let events: Vec<Value> = (0..12)
        .map(|i| location_changed(i as f64 * 500.0, 5.0, 60 - i))
        .collect();
    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(&events)
        .to_request();
    let resp: LocationUpdateResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.outcomes, vec![SampleOutcome::Admitted; 12]);
    assert!(!resp.trip_ended);
    assert!(ctx.notifier.events().await.is_empty());
}

#[actix_web::test]
async fn stale_samples_do_not_end_trip() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    // An hour old, outside of the five minute time horizon
    let events: Vec<Value> = (0..10)
        .map(|i| location_changed(i as f64, 5.0, 3600 - i))
        .collect();
    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(&events)
        .to_request();
    let resp: LocationUpdateResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.outcomes, vec![SampleOutcome::Admitted; 10]);
    assert!(!resp.trip_ended);
}

#[actix_web::test]
async fn low_accuracy_and_duplicate_samples_are_rejected() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let events = vec![
        location_changed(0.0, 5.0, 3),
        location_changed(0.0, 5.0, 2),
        location_changed(50.0, 250.0, 1),
    ];
    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(&events)
        .to_request();
    let resp: LocationUpdateResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        resp.outcomes,
        vec![
            SampleOutcome::Admitted,
            SampleOutcome::RejectedDuplicate,
            SampleOutcome::RejectedLowAccuracy,
        ]
    );

    let session_id = SessionId(SESSION_ID.to_string());
    assert_eq!(ctx.store.get_raw_samples(&session_id).await.len(), 3);
    assert_eq!(
        ctx.store
            .get_last_filtered_samples(&session_id, 10)
            .await
            .expect("read")
            .len(),
        1
    );
}

#[actix_web::test]
async fn outcomes_follow_request_order_while_samples_follow_capture_order() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    // Same position, the older sample arrives second and is admitted first
    let events = vec![
        location_changed(0.0, 5.0, 1),
        json!({ "type": "LOCATION_AVAILABILITY", "available": true }),
        location_changed(0.0, 5.0, 5),
    ];
    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(&events)
        .to_request();
    let resp: LocationUpdateResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        resp.outcomes,
        vec![
            SampleOutcome::RejectedDuplicate,
            SampleOutcome::Skipped,
            SampleOutcome::Admitted,
        ]
    );
}

#[actix_web::test]
async fn invalid_sample_rejects_the_whole_request() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let mut invalid = location_changed(0.0, 5.0, 1);
    invalid["pt"]["lat"] = json!(95.0);
    let events = vec![location_changed(0.0, 5.0, 2), invalid];

    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(&events)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error_code, "INVALID_SAMPLE");

    let session_id = SessionId(SESSION_ID.to_string());
    assert!(ctx.store.get_raw_samples(&session_id).await.is_empty());
    assert!(ctx
        .store
        .try_lock_session(&session_id, 10)
        .await
        .expect("lock"));
}

#[actix_web::test]
async fn concurrent_update_of_a_session_is_refused() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let session_id = SessionId(SESSION_ID.to_string());
    assert!(ctx
        .store
        .try_lock_session(&session_id, 60)
        .await
        .expect("lock"));

    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(vec![location_changed(0.0, 5.0, 1)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error_code, "UNDER_PROCESSING");
    assert!(ctx.store.get_raw_samples(&session_id).await.is_empty());
}

#[actix_web::test]
async fn lock_is_released_after_processing() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    for age_secs in [2, 1] {
        let req = test::TestRequest::post()
            .uri(&location_uri(SESSION_ID))
            .set_json(vec![location_changed(age_secs as f64 * 10.0, 5.0, age_secs)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn empty_request_is_invalid() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(Vec::<Value>::new())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error_code, "INVALID_REQUEST");
}

#[actix_web::test]
async fn malformed_request_is_unprocessible() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .set_json(json!([{ "type": "LOCATION_TELEPORTED" }]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error_code, "UNPROCESSIBLE_REQUEST");
}

#[actix_web::test]
async fn oversized_request_is_refused() {
    let store = Arc::new(InMemoryHistoryStore::new(3600));
    let mut app_state = AppState::with_collaborators(
        store,
        Arc::new(InMemoryTripEndNotifier::new()),
        TripEndThresholds::default(),
    )
    .expect("default thresholds are valid");
    app_state.max_allowed_req_size = 16;
    let data = web::Data::new(app_state);
    let app = test_app!(data);

    let body = serde_json::to_string(&vec![location_changed(0.0, 5.0, 1)]).expect("json");
    let req = test::TestRequest::post()
        .uri(&location_uri(SESSION_ID))
        .insert_header(("content-type", "application/json"))
        .insert_header((CONTENT_LENGTH, body.len().to_string()))
        .set_payload(body)
        .to_request();

    match test::try_call_service(&app, req).await {
        Ok(resp) => assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE),
        Err(err) => assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        ),
    }
}

#[actix_web::test]
async fn healthcheck_reports_service_up() {
    let ctx = test_context();
    let app = test_app!(ctx.data);

    let req = test::TestRequest::get().uri("/healthcheck").to_request();
    let resp: ResponseData = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.result, "Service Is Up");
}
