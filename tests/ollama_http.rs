use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use metaprompt_forge::{generate, list_models, ForgeError, MetaPrompt, OllamaClient, ServerEndpoint};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serve `app` from a background runtime and return its base URL.
fn spawn_mock_ollama(app: Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

type Captured = Arc<Mutex<Vec<Value>>>;

async fn capture_generate(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    captured.lock().unwrap().push(body);
    Json(json!({
        "model": "gemma2:9b",
        "response": "Entanglement is...",
        "done": true
    }))
}

fn answering_after(answer: &'static str, delay: Duration) -> Router {
    Router::new().route(
        "/api/generate",
        post(move |Json(_body): Json<Value>| async move {
            tokio::time::sleep(delay).await;
            Json(json!({ "response": answer }))
        }),
    )
}

#[test]
fn list_models_preserves_server_order() {
    let app = Router::new().route(
        "/api/tags",
        get(|| async {
            Json(json!({
                "models": [
                    { "name": "mistral:7b", "size": 4109865159u64 },
                    { "name": "gemma2:9b", "size": 5443152417u64 },
                    { "name": "codellama:13b" }
                ]
            }))
        }),
    );
    let url = spawn_mock_ollama(app);

    let names = list_models(&url).unwrap();

    assert_eq!(names, vec!["mistral:7b", "gemma2:9b", "codellama:13b"]);
}

#[test]
fn list_models_server_error_is_unreachable() {
    let app = Router::new().route("/api/tags", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let url = spawn_mock_ollama(app);

    assert!(matches!(list_models(&url), Err(ForgeError::Unreachable(_))));
}

#[test]
fn list_models_missing_models_key_is_bad_response() {
    let app = Router::new().route("/api/tags", get(|| async { Json(json!({})) }));
    let url = spawn_mock_ollama(app);

    assert!(matches!(list_models(&url), Err(ForgeError::BadResponse(_))));
}

#[test]
fn list_models_connection_refused_is_unreachable() {
    assert!(matches!(
        list_models("http://127.0.0.1:1"),
        Err(ForgeError::Unreachable(_))
    ));
}

#[test]
fn generate_returns_response_and_sends_wrapped_prompt() {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route("/api/generate", post(capture_generate))
        .with_state(captured.clone());
    let url = spawn_mock_ollama(app);
    let query = "What is quantum entanglement?";

    let result = generate(&url, "gemma2:9b", query);

    assert_eq!(result, Ok("Entanglement is...".to_string()));
    let bodies = captured.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "model": "gemma2:9b",
            "prompt": MetaPrompt::default().render(query),
            "stream": false
        })
    );
}

#[test]
fn generate_empty_query_makes_no_request() {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route("/api/generate", post(capture_generate))
        .with_state(captured.clone());
    let url = spawn_mock_ollama(app);

    assert_eq!(generate(&url, "gemma2:9b", "  \n "), Err(ForgeError::EmptyQuery));
    assert!(captured.lock().unwrap().is_empty());
}

#[test]
fn concurrent_generations_do_not_cross_talk() {
    let slow = spawn_mock_ollama(answering_after("slow answer", Duration::from_millis(300)));
    let fast = spawn_mock_ollama(answering_after("fast answer", Duration::ZERO));

    let slow_call = std::thread::spawn(move || generate(&slow, "gemma2:9b", "first question"));
    let fast_call = std::thread::spawn(move || generate(&fast, "llama3:8b", "second question"));

    assert_eq!(fast_call.join().unwrap(), Ok("fast answer".to_string()));
    assert_eq!(slow_call.join().unwrap(), Ok("slow answer".to_string()));
}

#[test]
fn generate_waits_past_client_default_timeout() {
    let url = spawn_mock_ollama(answering_after("slow but fine", Duration::from_secs(35)));

    let result = generate(&url, "gemma2:9b", "q");

    assert_eq!(result, Ok("slow but fine".to_string()));
}

#[test]
fn generate_honors_configured_timeout() {
    let url = spawn_mock_ollama(answering_after("too late", Duration::from_secs(5)));
    let client = OllamaClient::new(Some(Duration::from_millis(500))).unwrap();

    let result = client.generate(&ServerEndpoint::new(url, "gemma2:9b"), "q");

    assert!(matches!(result, Err(ForgeError::Unreachable(_))));
}
