use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::models::{CancellationMessage, ConfirmationMessage, NotificationEvent};
use notification_cell::router::notification_routes;
use notification_cell::services::mailer::MailerClient;
use notification_cell::NotificationDispatcher;
use shared_utils::test_utils::{ActorHeaders, MockStoreResponses, TestConfig};

async fn create_test_app(store_url: &str) -> Router {
    let config = TestConfig::with_endpoints(store_url, "http://localhost:54400");
    notification_routes(config.to_arc())
}

fn request_with_actor(
    method: &str,
    uri: &str,
    actor: [(&'static str, String); 2],
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in actor {
        builder = builder.header(name, value);
    }
    match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn confirmation_message() -> ConfirmationMessage {
    ConfirmationMessage {
        to: "patient@example.com".to_string(),
        patient_name: "Test Patient".to_string(),
        doctor_name: "Dr. Test".to_string(),
        date: "2025-07-10".to_string(),
        time: "09:00".to_string(),
    }
}

#[tokio::test]
async fn missing_settings_are_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/notification_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor("GET", "/1", ActorHeaders::patient(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn first_update_creates_settings_with_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/notification_settings"))
        .and(query_param("patient_id", "eq.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    // sms_enabled untouched by the patch keeps its default of false.
    Mock::given(method("POST"))
        .and(path("/rest/v1/notification_settings"))
        .and(body_partial_json(json!({
            "patient_id": 3,
            "email_enabled": false,
            "sms_enabled": false,
            "push_enabled": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::settings_row(9, 3, false)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor(
            "PATCH",
            "/3",
            ActorHeaders::patient(3),
            Some(json!({ "email_enabled": false })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email_enabled"], false);
    assert_eq!(body["patient_id"], 3);
}

#[tokio::test]
async fn existing_settings_are_patched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/notification_settings"))
        .and(query_param("patient_id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::settings_row(4, 1, true)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notification_settings"))
        .and(query_param("patient_id", "eq.1"))
        .and(body_partial_json(json!({ "sms_enabled": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 4,
                "patient_id": 1,
                "email_enabled": true,
                "sms_enabled": true,
                "push_enabled": true
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor(
            "PATCH",
            "/1",
            ActorHeaders::patient(1),
            Some(json!({ "sms_enabled": true })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["sms_enabled"], true);
}

#[tokio::test]
async fn mailer_client_posts_confirmation() {
    let mailer_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/confirmation"))
        .and(body_partial_json(json!({
            "to": "patient@example.com",
            "doctor_name": "Dr. Test",
            "date": "2025-07-10",
            "time": "09:00"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mailer_server)
        .await;

    let config = TestConfig::with_endpoints("http://localhost:54321", &mailer_server.uri());
    let mailer = MailerClient::new(&config.to_app_config()).unwrap();

    mailer.send_confirmation(&confirmation_message()).await.unwrap();
}

#[tokio::test]
async fn mailer_client_surfaces_api_failures() {
    let mailer_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/cancellation"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mailer_server)
        .await;

    let config = TestConfig::with_endpoints("http://localhost:54321", &mailer_server.uri());
    let mailer = MailerClient::new(&config.to_app_config()).unwrap();

    let message = CancellationMessage {
        to: "patient@example.com".to_string(),
        patient_name: "Test Patient".to_string(),
        doctor_name: "Dr. Test".to_string(),
        date: "2025-07-10".to_string(),
        time: "09:00".to_string(),
        reason: Some("Bác sĩ ốm".to_string()),
        notes: None,
    };

    let result = mailer.send_cancellation(&message).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn dispatcher_swallows_mailer_failures() {
    let mailer_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/confirmation"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mailer_server)
        .await;

    let config = TestConfig::with_endpoints("http://localhost:54321", &mailer_server.uri());
    let dispatcher = NotificationDispatcher::new(&config.to_app_config());

    // Must not panic or propagate the failure.
    dispatcher
        .dispatch(NotificationEvent::confirmed(confirmation_message()))
        .await;
}

#[tokio::test]
async fn dispatcher_is_a_no_op_without_mailer_config() {
    let config = TestConfig {
        mailer_base_url: String::new(),
        mailer_api_token: String::new(),
        ..TestConfig::default()
    };
    let dispatcher = NotificationDispatcher::new(&config.to_app_config());

    dispatcher
        .dispatch(NotificationEvent::confirmed(confirmation_message()))
        .await;
}
