pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod router;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::api::state::AppState;
    use crate::config::{Config, NotionConfig, QuestConfig, ServerConfig};
    use crate::intelligence::FALLBACK_QUESTIONS;
    use crate::llm::LlmProvider;
    use crate::models::{CharacterProfile, DatabaseIds, QuestCountPolicy, UserRecord};
    use crate::store::memory::{InMemoryAdmin, InMemoryWorkspace, StaticConnector};

    fn ids() -> DatabaseIds {
        DatabaseIds {
            character: Some("char-db".to_string()),
            activity: Some("activity-db".to_string()),
            quest: Some("quest-db".to_string()),
            diary: Some("diary-db".to_string()),
        }
    }

    /// App state over in-memory stores with no LLM configured. User `Hero`
    /// is registered with token `token` and has a character.
    pub(crate) fn test_state(api_keys: Vec<String>) -> (AppState, Arc<InMemoryWorkspace>) {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                api_keys,
            },
            notion: NotionConfig {
                admin_token: None,
                admin_users_db_id: None,
                base_url: "http://localhost".to_string(),
                timeout_secs: 5,
            },
            reasoner: None,
            formatter: None,
            quests: QuestConfig {
                check_interval_secs: 3600,
                min_active_quests: 2,
                count_policy: QuestCountPolicy::Standard,
            },
        };

        let workspace = Arc::new(InMemoryWorkspace::with_databases(ids()));
        workspace.state.lock().unwrap().characters.push(CharacterProfile {
            name: "Hero".to_string(),
            personality_type: Some("INFP".to_string()),
            goals: None,
            preferences: None,
        });
        let admin = Arc::new(InMemoryAdmin::with_user(UserRecord {
            name: "Hero".to_string(),
            notion_api_key: Some("token".to_string()),
            notion_url: None,
            database_ids: ids(),
        }));
        let connector = Arc::new(StaticConnector::with("token", workspace.clone()));

        let state = AppState::new(
            config,
            admin,
            connector,
            LlmProvider::new(None),
            LlmProvider::new(None),
        );
        (state, workspace)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("Authorization", "Bearer key")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn protected_route_requires_auth() {
        let (state, _) = test_state(vec!["key".to_string()]);
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/quests/Hero")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "unauthorized");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn health_is_public_and_reports_providers() {
        let (state, _) = test_state(vec!["secret".to_string()]);
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["reasoner"]["status"], "unavailable");
        assert_eq!(json["data"]["quests"]["minActiveQuests"], 2);
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn openapi_json_is_public_and_valid() {
        let (state, _) = test_state(vec!["secret".to_string()]);
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let version = json["openapi"]
            .as_str()
            .expect("openapi field should be a string");
        assert!(version.starts_with('3'));
        assert!(json["paths"]["/api/v1/quests/{name}/generate"].is_object());
    }

    #[tokio::test]
    async fn reflection_without_llm_uses_fallback_questions() {
        let (state, workspace) = test_state(vec!["key".to_string()]);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        workspace
            .state
            .lock()
            .unwrap()
            .journals
            .insert(date, "긴 하루였다".to_string());
        let app = create_router(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/daily/Hero/reflection",
                serde_json::json!({"date": "2024-05-01"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        let questions: Vec<String> =
            serde_json::from_value(json["data"]["questions"].clone()).unwrap();
        assert_eq!(questions, FALLBACK_QUESTIONS.map(String::from).to_vec());
    }

    #[tokio::test]
    async fn generate_without_llm_is_unavailable_and_writes_nothing() {
        let (state, workspace) = test_state(vec!["key".to_string()]);
        let app = create_router(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/quests/Hero/generate",
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "service_unavailable");
        assert!(workspace.state.lock().unwrap().quests.is_empty());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (state, _) = test_state(vec!["key".to_string()]);
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/quests/Nobody")
                    .header("Authorization", "Bearer key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_date_is_rejected() {
        let (state, _) = test_state(vec!["key".to_string()]);
        let app = create_router(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/daily/Hero/wrap-up",
                serde_json::json!({"date": "yesterday"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn update_character_patches_fields() {
        let (state, workspace) = test_state(vec!["key".to_string()]);
        let app = create_router(state);

        let response = app
            .oneshot(json_request(
                "PATCH",
                "/api/v1/characters/Hero",
                serde_json::json!({"goals": "finish the book"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["goals"], "finish the book");
        assert_eq!(json["data"]["personalityType"], "INFP");
        assert_eq!(
            workspace.state.lock().unwrap().characters[0].goals.as_deref(),
            Some("finish the book")
        );
    }
}
