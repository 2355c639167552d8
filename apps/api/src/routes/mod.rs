pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::personalized::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Personalized page
        .route("/api/v1/personalized", get(handlers::handle_personalized))
        .route(
            "/api/v1/personalized/jobs",
            get(handlers::handle_recommended_jobs),
        )
        .route(
            "/api/v1/personalized/suggestions",
            get(handlers::handle_suggestions),
        )
        .route("/api/v1/skills/:name", get(handlers::handle_skill_details))
        // Client view state
        .route(
            "/api/v1/views/:view_id/activate",
            post(handlers::handle_activate_view),
        )
        .route(
            "/api/v1/views/:view_id",
            get(handlers::handle_get_view).delete(handlers::handle_close_view),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::models::jobs::SkillDetail;
    use crate::personalized::resolver::ResolverSettings;
    use crate::personalized::service::PersonalizedService;
    use crate::personalized::testing::{profile, role, suggestion, FakeInsightsApi};
    use crate::personalized::view::ViewRegistry;

    fn app() -> Router {
        let api = Arc::new(
            FakeInsightsApi::new()
                .with_profile(profile(json!({
                    "email": "sam@example.com",
                    "industries": ["Tech"],
                    "skills": {"Languages": ["Python", "None"]},
                    "interested_roles": ["Data Scientist"]
                })))
                .with_suggestions(Ok(vec![suggestion("python"), suggestion("docker")]))
                .with_skill_matches(Ok(vec![]))
                .with_roles(
                    "Tech",
                    Ok(vec![role("data scientist", &["Google"]), role("data engineer", &[])]),
                )
                .with_skill_detail(SkillDetail {
                    skill_name: "Docker".to_string(),
                    description: "Containers".to_string(),
                    ..Default::default()
                }),
        );
        build_router(AppState {
            personalized: PersonalizedService::new(api.clone(), ResolverSettings::default(), 10),
            api,
            views: Arc::new(ViewRegistry::default()),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_personalized_report() {
        let (status, body) = get_json(app(), "/api/v1/personalized?email=sam@example.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["Python"]));
        assert_eq!(body["show_forecast"], true);
        assert_eq!(body["postings"].as_array().unwrap().len(), 2);
        assert_eq!(body["postings"][0]["title"], "Data Scientist");
        assert_eq!(body["postings"][0]["recommended"], false);
        assert_eq!(body["suggestions"][0]["name"], "Docker");
        assert_eq!(body["error"], Value::Null);
    }

    #[tokio::test]
    async fn test_email_from_header() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/personalized/jobs")
                    .header("x-user-email", "sam@example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_email_is_unauthorized() {
        let (status, body) = get_json(app(), "/api/v1/personalized/suggestions").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (status, _) = get_json(app(), "/api/v1/personalized?email=ghost@example.com").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_skill_details() {
        let (status, body) = get_json(app(), "/api/v1/skills/docker").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Containers");

        let (status, _) = get_json(app(), "/api/v1/skills/cobol").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_view_activate_then_read() {
        let app = app();
        let view_id = Uuid::new_v4();

        let (status, _) = get_json(app.clone(), &format!("/api/v1/views/{view_id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/views/{view_id}/activate"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email": "sam@example.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let mut body = Value::Null;
        for _ in 0..50 {
            let (_, b) = get_json(app.clone(), &format!("/api/v1/views/{view_id}")).await;
            body = b;
            if body["epoch"] == 1 && body["loading"] == false {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(body["email"], "sam@example.com");
        assert_eq!(body["postings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_close_view() {
        let app = app();
        let view_id = Uuid::new_v4();
        let activate = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/views/{view_id}/activate"))
            .header("x-user-email", "sam@example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(activate).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/views/{view_id}"))
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (status, _) = get_json(app.clone(), &format!("/api/v1/views/{view_id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let response = app.oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
