use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use gitedit_core::models::base64_bytes;
use gitedit_core::{Editor, Error, FileSnapshot, FileState, ModificationRequest, ModificationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub editor: Arc<Editor>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/files", get(list_tracked_files))
        .route("/files/*path", get(get_file_detail))
        .route("/modify", post(modify_code))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileList {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileDetail {
    pub path: String,
    pub state: FileState,
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub original: Vec<u8>,
}

impl From<FileSnapshot> for FileDetail {
    fn from(snapshot: FileSnapshot) -> Self {
        Self {
            path: snapshot.path,
            state: snapshot.state,
            content: snapshot.current,
            original: snapshot.reference,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::FileNotFound(_) | Error::PathNotInHistory(_) => StatusCode::NOT_FOUND,
        Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
        err if err.is_collaborator() => StatusCode::BAD_GATEWAY,
        Error::Cancelled => StatusCode::REQUEST_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(operation: &str, err: Error) -> ApiError {
    let status = status_for(&err);
    let message = err.to_string();
    warn!(%status, "{} failed: {}", operation, message);
    (status, Json(ErrorBody { error: message }))
}

/// Cancels when dropped, so work for a request that is abandoned (client
/// disconnect or timeout) stops with it.
fn request_token() -> (CancellationToken, tokio_util::sync::DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn list_tracked_files(State(state): State<AppState>) -> Result<Json<FileList>, ApiError> {
    let (cancel, _guard) = request_token();

    let files = state
        .editor
        .list_tracked_files(&cancel)
        .await
        .map_err(|e| api_error("list tracked files", e))?;

    info!("Listed {} tracked files", files.len());
    Ok(Json(FileList { files }))
}

async fn get_file_detail(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<FileDetail>, ApiError> {
    let (cancel, _guard) = request_token();

    let snapshot = state
        .editor
        .get_file_detail(&path, &cancel)
        .await
        .map_err(|e| api_error("get file detail", e))?;

    info!("Served {} ({})", snapshot.path, snapshot.state.as_str());
    Ok(Json(snapshot.into()))
}

async fn modify_code(
    State(state): State<AppState>,
    Json(request): Json<ModificationRequest>,
) -> Result<Json<ModificationResult>, ApiError> {
    let (cancel, _guard) = request_token();

    info!(
        path = %request.path,
        line_start = request.line_start,
        line_end = request.line_end,
        "Modification requested"
    );

    state
        .editor
        .modify_code(request, &cancel)
        .await
        .map(Json)
        .map_err(|e| api_error("modify code", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use gitedit_core::rewrite::{MockBehavior, MockRewriter, RewriterCall};
    use git2::{IndexAddOption, Repository, Signature};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn init_repo(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        for (path, content) in files {
            let full_path = dir.path().join(path);
            std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
            std::fs::write(full_path, content).unwrap();
        }

        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::now("gitedit", "gitedit@example.com").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
            .unwrap();

        dir
    }

    fn router(dir: &TempDir, rewriter: &MockRewriter) -> Router {
        let editor = Editor::new(dir.path(), Arc::new(rewriter.clone()));
        create_router(AppState {
            editor: Arc::new(editor),
        })
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn decode(value: &serde_json::Value) -> Vec<u8> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        STANDARD.decode(value.as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = init_repo(&[("a.go", "package a\n")]);
        let (status, body) = send(router(&dir, &MockRewriter::default()), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_files_skips_ignored() {
        let dir = init_repo(&[("a.go", "package a\n"), (".gitignore", "*.log\n")]);
        std::fs::write(dir.path().join("debug.log"), "noise").unwrap();

        let (status, body) = send(router(&dir, &MockRewriter::default()), get("/files")).await;
        assert_eq!(status, StatusCode::OK);

        let mut files: Vec<String> = serde_json::from_value(body["files"].clone()).unwrap();
        files.sort();
        assert_eq!(files, vec![".gitignore", "a.go"]);
    }

    #[tokio::test]
    async fn test_unmodified_file_detail() {
        let dir = init_repo(&[("a.go", "package a\n")]);

        let (status, body) =
            send(router(&dir, &MockRewriter::default()), get("/files/a.go")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "UNMODIFIED");
        assert_eq!(decode(&body["content"]), b"package a\n");
        assert_eq!(decode(&body["original"]), b"package a\n");
    }

    #[tokio::test]
    async fn test_modified_nested_file_detail() {
        let dir = init_repo(&[("pkg/b.go", "package b\n")]);
        std::fs::write(dir.path().join("pkg/b.go"), "package b\n\nvar X = 1\n").unwrap();

        let (status, body) =
            send(router(&dir, &MockRewriter::default()), get("/files/pkg/b.go")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "pkg/b.go");
        assert_eq!(body["state"], "MODIFIED");
        assert_eq!(decode(&body["content"]), b"package b\n\nvar X = 1\n");
        assert_eq!(decode(&body["original"]), b"package b\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = init_repo(&[("a.go", "package a\n")]);

        let (status, body) =
            send(router(&dir, &MockRewriter::default()), get("/files/nope.go")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nope.go"));
    }

    #[tokio::test]
    async fn test_modify_code() {
        let content: String = (0..10).map(|i| format!("x{} = {}\n", i, i)).collect();
        let dir = init_repo(&[("c.py", content.as_str())]);
        let rewriter = MockRewriter::answering("x2: int = 2", "Annotated the variables.");

        let (status, body) = send(
            router(&dir, &rewriter),
            post_json(
                "/modify",
                serde_json::json!({
                    "path": "c.py",
                    "instruction": "add type hints",
                    "line_start": 2,
                    "line_end": 5,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["explanation"], "Annotated the variables.");
        assert_eq!(body["modified_files"], serde_json::json!(["c.py"]));
        assert_eq!(body["modified_code"], "x2: int = 2");
        assert_eq!(
            rewriter.calls()[0],
            RewriterCall::Rewrite {
                language: ".py".to_string(),
                code: "x2 = 2\nx3 = 3\nx4 = 4".to_string(),
                instruction: "add type hints".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_collaborator_failure_is_reported_per_request() {
        let dir = init_repo(&[("c.py", "x = 1\n")]);
        let rewriter = MockRewriter::new(MockBehavior::AlwaysError);
        let router = router(&dir, &rewriter);

        let request = serde_json::json!({"path": "c.py", "instruction": "rename"});
        let (status, body) = send(router.clone(), post_json("/modify", request.clone())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("Mock rewrite error"));

        // The same router keeps serving after a failure.
        rewriter.set_behavior(MockBehavior::default());
        let (status, _) = send(router, post_json("/modify", request)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_no_choices_is_bad_gateway() {
        let dir = init_repo(&[("c.py", "x = 1\n")]);
        let rewriter = MockRewriter::new(MockBehavior::NoChoices);

        let (status, body) = send(
            router(&dir, &rewriter),
            post_json("/modify", serde_json::json!({"path": "c.py", "instruction": "a"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "No completion response received");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Error::InvalidPath("../x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&Error::PathNotInHistory("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&Error::Cancelled), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            status_for(&Error::collaborator(anyhow::anyhow!("quota exceeded"))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&Error::NoCompletionReceived),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&Error::RepositoryOpen {
                path: "/nope".into(),
                source: git2::Error::from_str("not a repository"),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
