use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::router::patient_routes;
use shared_utils::test_utils::{ActorHeaders, MockStoreResponses, TestConfig};

async fn create_test_app(store_url: &str) -> Router {
    let config = TestConfig::with_endpoints(store_url, "http://localhost:54400");
    patient_routes(config.to_arc())
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

#[tokio::test]
async fn unknown_patient_is_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor("GET", "/42", ActorHeaders::receptionist(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creates_patient_with_201() {
    let mock_server = MockServer::start().await;

    // Uniqueness probe finds nothing.
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::patient_row(5, "Emma Wilson", "emma.w@email.com")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor(
            "POST",
            "/",
            ActorHeaders::receptionist(1),
            Some(json!({
                "full_name": "Emma Wilson",
                "email": "emma.w@email.com",
                "phone": "+1 (555) 321-0987",
                "date_of_birth": "1992-05-30",
                "address": "321 Elm St"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["id"], 5);
    assert_eq!(body["full_name"], "Emma Wilson");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.john.doe@email.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_row(1, "John Doe", "john.doe@email.com")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor(
            "POST",
            "/",
            ActorHeaders::receptionist(1),
            Some(json!({
                "full_name": "John Doe",
                "email": "john.doe@email.com",
                "phone": "+1 (555) 123-4567"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_profile_reports_field_errors_without_touching_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor(
            "POST",
            "/",
            ActorHeaders::receptionist(1),
            Some(json!({
                "full_name": "",
                "email": "not-an-email",
                "phone": "+1 (555) 000-0000"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"full_name"));
    assert!(fields.contains(&"email"));
}

#[tokio::test]
async fn updates_patient_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_row(1, "John A. Doe", "john.doe@email.com")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor(
            "PUT",
            "/1",
            ActorHeaders::patient(1),
            Some(json!({
                "full_name": "John A. Doe",
                "email": "john.doe@email.com",
                "phone": "+1 (555) 123-4567"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["full_name"], "John A. Doe");
}

#[tokio::test]
async fn finds_patient_by_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.john.doe@email.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_row(1, "John Doe", "john.doe@email.com")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri()).await;
    let response = app
        .oneshot(request_with_actor(
            "GET",
            "/by-email/john.doe%40email.com",
            ActorHeaders::receptionist(1),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
}
