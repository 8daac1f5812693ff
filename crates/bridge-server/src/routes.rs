//! Router

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    acquire_licenses, build_order, create_session, end_session, finalize_order, health_check,
    repack_order,
};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))
        // Orders
        .route("/api/orders", post(build_order))
        .route("/api/orders/repack", post(repack_order))
        // Direct mode sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", delete(end_session))
        .route("/api/sessions/{id}/licenses", post(acquire_licenses))
        .route("/api/sessions/{id}/finalize", post(finalize_order))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use bridge_core::{LicenseBundle, LicenseEntry, Order};
    use bridge_gateway::{BackendGateway, BridgeConfig, MockTransport, Url};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::handlers::SessionResponse;

    fn config() -> BridgeConfig {
        BridgeConfig::new(
            Url::parse("http://backend.test/submit").unwrap(),
            Url::parse("http://backend.test/finalize").unwrap(),
        )
    }

    fn app(mock: Arc<MockTransport>) -> Router {
        create_router(AppState::new(BackendGateway::new(mock), config()))
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn order_request() -> Value {
        json!({
            "reference_id": "cart-1",
            "products": [{ "name": "Pro", "quantity": 2, "price": 1.5, "code": "PRO" }]
        })
    }

    fn bundle() -> LicenseBundle {
        LicenseBundle(vec![LicenseEntry {
            name: "Pro".into(),
            licenses: vec!["k1".into(), "k2".into()],
        }])
    }

    async fn new_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json("/api/sessions", &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: SessionResponse = serde_json::from_value(body_json(response).await).unwrap();
        created.session_id
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Arc::new(MockTransport::new()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_build_order_uses_configured_currency() {
        let app = app(Arc::new(MockTransport::new()));
        let response = app
            .oneshot(post_json("/api/orders", &order_request()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let order: Order = serde_json::from_value(body_json(response).await).unwrap();
        let amount = order.first_unit().unwrap().amount.clone().unwrap();
        assert_eq!(amount.currency_code, "USD");
        assert_eq!(amount.value, "3.00");
    }

    #[tokio::test]
    async fn test_build_order_accepts_string_prices() {
        let app = app(Arc::new(MockTransport::new()));
        let request = json!({
            "reference_id": "cart-2",
            "products": [
                { "name": "Pro", "quantity": 1, "price": "19.99", "code": "PRO" },
                { "name": "Gift", "quantity": 1, "price": "free", "code": "GIFT" }
            ]
        });

        let response = app.oneshot(post_json("/api/orders", &request)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let order: Order = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(order.items()[0].unit_amount.as_ref().unwrap().value, "19.99");
        assert_eq!(order.items()[1].unit_amount.as_ref().unwrap().value, "free");
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_error() {
        let mock = Arc::new(MockTransport::new());
        let app = app(mock.clone());

        let response = app
            .clone()
            .oneshot(post_json("/api/orders", &json!({ "reference_id": "cart-3" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert!(body["error"].as_str().unwrap().contains("products"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/orders/repack")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_REQUEST");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_session_limit() {
        let mut config = config();
        config.max_sessions = 1;
        let app = create_router(AppState::new(
            BackendGateway::new(Arc::new(MockTransport::new())),
            config,
        ));
        new_session(&app).await;

        let response = app
            .oneshot(post_json("/api/sessions", &json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["code"], "SESSION_LIMIT");
    }

    #[tokio::test]
    async fn test_direct_flow() {
        let mock = Arc::new(
            MockTransport::new()
                .reply_success(&bundle())
                .reply_success(&json!(null)),
        );
        let app = app(mock.clone());
        let id = new_session(&app).await;

        let response = app
            .clone()
            .oneshot(post_json(&format!("/api/sessions/{id}/licenses"), &order_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let acquired: LicenseBundle = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(acquired, bundle());

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/sessions/{id}/finalize"),
                &json!({ "details": { "orderID": "PAY-1" } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].body["licenses"], serde_json::to_value(bundle()).unwrap());
        assert_eq!(requests[1].body["details"]["orderID"], "PAY-1");
    }

    #[tokio::test]
    async fn test_backend_rejection_maps_to_bad_gateway() {
        let mock = Arc::new(MockTransport::new().reply_failure("Unknown product code"));
        let app = app(mock);
        let id = new_session(&app).await;

        let response = app
            .oneshot(post_json(&format!("/api/sessions/{id}/licenses"), &order_request()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unknown product code");
        assert_eq!(body["code"], "BACKEND_REJECTED");
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let mock = Arc::new(MockTransport::new());
        let app = app(mock.clone());

        let response = app
            .oneshot(post_json("/api/sessions/nope/licenses", &order_request()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_end_session() {
        let app = app(Arc::new(MockTransport::new()));
        let id = new_session(&app).await;
        let delete = |id: &str| {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{id}"))
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(delete(&id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(delete(&id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_repack_flow() {
        let returned = json!({
            "purchase_units": [{
                "reference_id": "cart-1",
                "items": [{ "name": "Pro", "quantity": 2, "code": "PRO", "licenses": ["k1", "k2"] }]
            }]
        });
        let mock = Arc::new(MockTransport::new().reply_success(&returned));
        let app = app(mock);

        let response = app
            .oneshot(post_json("/api/orders/repack", &order_request()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let order: Order = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(order.items().len(), 2);
        assert!(order.items().iter().all(|item| item.quantity == Some(1) && item.code.is_none()));
    }

    #[tokio::test]
    async fn test_repack_count_mismatch_is_unprocessable() {
        let returned = json!({
            "purchase_units": [{
                "items": [{ "name": "Pro", "quantity": 2, "code": "PRO", "licenses": ["k1"] }]
            }]
        });
        let mock = Arc::new(MockTransport::new().reply_success(&returned));
        let app = app(mock);

        let response = app
            .oneshot(post_json("/api/orders/repack", &order_request()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "SCHEMA_ERROR");
        assert_eq!(body["field"], "licenses");
    }
}
