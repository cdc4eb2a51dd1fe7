//! Common test utilities for integration tests
//!
//! Builds the full router on the in-memory store with a scripted generator.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use vitatone_backend::{
    config::{AppConfig, StorageBackend},
    generator::{GeneratorError, TextGenerator},
    repositories::InMemoryHealthStore,
    routes,
    state::AppState,
};

/// A seven-day plan the way the generator returns it, inside a fenced block
pub const FENCED_PLAN: &str = r#"Here is your plan:
```json
[
  {"food": {"breakfast": ["Oats"], "lunch": ["Salad"], "dinner": ["Fish"], "snacks": ["Apple"]}, "exercise": ["Walk 30 min"]},
  {"food": {"breakfast": ["Eggs"], "lunch": ["Soup"], "dinner": ["Chicken"], "snacks": []}, "exercise": ["Yoga"]}
]
```
Stay hydrated!"#;

/// Generator that replays a fixed answer and records the prompts it saw
pub struct ScriptedGenerator {
    answer: Result<String, GeneratorError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn answering(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GeneratorError) -> Self {
        Self {
            answer: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone()
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub generator: Arc<ScriptedGenerator>,
}

impl TestApp {
    /// Application whose generator answers with `FENCED_PLAN`
    pub fn new() -> Self {
        Self::with_generator(ScriptedGenerator::answering(FENCED_PLAN))
    }

    pub fn with_generator(generator: ScriptedGenerator) -> Self {
        let generator = Arc::new(generator);
        let state = AppState::new(
            Arc::new(InMemoryHealthStore::new()),
            generator.clone(),
            test_config(),
        );
        let app = routes::create_router(state);

        Self { app, generator }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send_json("POST", path, body).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send_json("PATCH", path, body).await
    }

    /// POST and parse the response body as JSON
    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let (status, body) = self.post(path, &body.to_string()).await;
        (status, parse(&body))
    }

    /// GET and parse the response body as JSON
    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(path).await;
        (status, parse(&body))
    }

    /// Save a profile and return its id
    pub async fn create_profile(&self, email: &str) -> String {
        let (status, body) = self
            .post_json("/api/v1/profiles", sample_profile(email))
            .await;
        assert_eq!(status, StatusCode::OK, "profile creation failed: {}", body);
        body["profile"]["id"].as_str().unwrap().to_string()
    }

    async fn send_json(&self, method: &str, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

/// A complete profile form
pub fn sample_profile(email: &str) -> Value {
    serde_json::json!({
        "full_name": "Ada Lovelace",
        "email": email,
        "date_of_birth": "1990-05-15",
        "gender": "female",
        "current_weight": "65",
        "current_height": 170,
        "goal": "weight_loss",
        "exercise_frequency": "3-4 times a week",
        "diet_preference": "vegetarian",
        "meals_per_day": "3",
        "food_allergies": ["peanuts"],
        "health_conditions": ["none"],
        "activity_level": "moderate"
    })
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.storage.backend = StorageBackend::Memory;
    config.ai.enabled = true;
    config
}
