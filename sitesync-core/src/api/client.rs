//! HTTP client for the construction-management REST backend.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::draft::Payload;
use crate::kind::ResourceKind;
use crate::normalize;
use crate::resource::ResourceId;
use crate::session::SessionUser;
use crate::sync::{NetworkError, NetworkErrorKind};
use crate::upload::FileHandle;

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiOptions {
    pub base_url: String,
    /// Scheme placed before the token in the `Authorization` header
    pub auth_scheme: String,
    pub timeout: Duration,
    /// Append `/` to every request path
    pub trailing_slash: bool,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            auth_scheme: "Token".to_string(),
            timeout: Duration::from_secs(30),
            trailing_slash: false,
        }
    }
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access", alias = "key")]
    pub token: String,
    pub user: SessionUser,
}

/// Client for the resource endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_scheme: String,
    trailing_slash: bool,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(options: ApiOptions) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: build_http_url(&options.base_url),
            auth_scheme: options.auth_scheme,
            trailing_slash: options.trailing_slash,
            token: None,
        })
    }

    /// Returns a client that authenticates every request with `token`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if self.trailing_slash && !url.ends_with('/') {
            url.push('/');
        }
        url
    }

    /// `GET /{resource}`. `Ok(None)` means the server sent no body.
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
    ) -> Result<Option<Vec<T>>, NetworkError> {
        let body = self.send(self.request(Method::GET, kind.endpoint())).await?;
        normalize::decode_list(body, kind.aliases())
    }

    /// `POST /{resource}` as JSON, or as multipart when the payload carries a file.
    pub async fn create<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        payload: Payload,
    ) -> Result<T, NetworkError> {
        let request = self.request(Method::POST, kind.endpoint());
        let request = match payload {
            Payload::Json(fields) => request.json(&fields),
            Payload::Multipart { fields, file } => {
                request.multipart(multipart_form(fields, &file).await?)
            }
        };
        let body = self.send(request).await?;
        normalize::decode_record(body, kind.aliases())
    }

    /// `PATCH /{resource}/{id}` with a partial record.
    pub async fn update<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        patch: Map<String, Value>,
    ) -> Result<T, NetworkError> {
        let path = format!("{}/{}", kind.endpoint(), id);
        let body = self.send(self.request(Method::PATCH, &path).json(&patch)).await?;
        normalize::decode_record(body, kind.aliases())
    }

    /// `POST /auth/login`.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, NetworkError> {
        let request = self
            .request(Method::POST, "auth/login")
            .json(&json!({ "username": username, "password": password }));
        let body = self.send(request).await?;
        serde_json::from_value(normalize::extract_record(body))
            .map_err(|e| NetworkError::malformed(format!("Unexpected login response: {}", e)))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(%method, %url, "request");
        let request = self.http.request(method, url);
        match &self.token {
            Some(token) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", self.auth_scheme, token),
            ),
            None => request,
        }
    }

    /// Sends a request and returns its JSON body, `Null` when empty.
    async fn send(&self, request: RequestBuilder) -> Result<Value, NetworkError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "request rejected");
            return Err(NetworkError::status(status.as_u16(), error_detail(status, &text)));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| NetworkError::malformed(format!("Unexpected response from server: {}", e)))
    }
}

/// Normalizes a configured base URL: adds a scheme if missing, maps
/// websocket schemes to HTTP, and drops trailing slashes.
pub fn build_http_url(base: &str) -> String {
    let base = base.trim();
    let url = if let Some(rest) = base.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else if let Some(rest) = base.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("http://{}", base)
    };
    url.trim_end_matches('/').to_string()
}

/// The `detail` of an error body, if it has one.
fn error_detail(status: StatusCode, text: &str) -> Option<String> {
    let body: Value = serde_json::from_str(text).ok()?;
    match body.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => {
            tracing::debug!(status = status.as_u16(), detail = %other, "structured error detail");
            Some(other.to_string())
        }
    }
}

async fn multipart_form(fields: Map<String, Value>, file: &FileHandle) -> Result<Form, NetworkError> {
    let mut form = Form::new();
    for (name, value) in fields {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        form = form.text(name, text);
    }

    let path = file.path();
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        NetworkError::new(
            NetworkErrorKind::Attachment,
            format!("Failed to read '{}': {}", path.display(), e),
        )
    })?;
    let part = Part::bytes(bytes)
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(|e| {
            NetworkError::new(
                NetworkErrorKind::Attachment,
                format!("Invalid file type '{}': {}", file.mime_type, e),
            )
        })?;
    Ok(form.part("file", part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, PurchaseOrder, Task};
    use crate::resource::Record;
    use axum::extract::{Multipart, Path};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use tempfile::TempDir;

    async fn serve(app: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        ApiClient::new(ApiOptions {
            base_url: format!("http://{}", addr),
            ..ApiOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_http_url() {
        assert_eq!(build_http_url("http://host/api/"), "http://host/api");
        assert_eq!(build_http_url("ws://host:8000"), "http://host:8000");
        assert_eq!(build_http_url("wss://host"), "https://host");
        assert_eq!(build_http_url("host:8000/api"), "http://host:8000/api");
    }

    #[test]
    fn test_url_trailing_slash() {
        let client = ApiClient::new(ApiOptions {
            base_url: "http://host/api/".to_string(),
            trailing_slash: true,
            ..ApiOptions::default()
        })
        .unwrap();
        assert_eq!(client.url("tasks"), "http://host/api/tasks/");
        assert_eq!(client.url("/tasks/3"), "http://host/api/tasks/3/");
    }

    #[tokio::test]
    async fn test_list_unwraps_envelopes() {
        let app = Router::new()
            .route(
                "/tasks",
                get(|| async { Json(json!({"data": [{"id": 1, "title": "Pour slab"}]})) }),
            )
            .route(
                "/purchase-orders",
                get(|| async {
                    Json(json!({"count": 1, "results": [{"id": 2, "total": "1250.00"}]}))
                }),
            );
        let client = serve(app).await;

        let tasks: Vec<Task> = client.list(ResourceKind::Task).await.unwrap().unwrap();
        assert_eq!(tasks[0].title, "Pour slab");

        let orders: Vec<PurchaseOrder> =
            client.list(ResourceKind::PurchaseOrder).await.unwrap().unwrap();
        assert_eq!(orders[0].total_amount, Some(1250.0));
    }

    #[tokio::test]
    async fn test_list_empty_body_is_none() {
        let app = Router::new().route("/messages", get(|| async { StatusCode::NO_CONTENT }));
        let client = serve(app).await;

        let messages: Option<Vec<Record>> = client.list(ResourceKind::Message).await.unwrap();
        assert_eq!(messages, None);
    }

    #[tokio::test]
    async fn test_list_malformed_shape() {
        let app = Router::new().route("/tasks", get(|| async { Json(json!({"ok": true})) }));
        let client = serve(app).await;

        let err = client.list::<Task>(ResourceKind::Task).await.unwrap_err();
        assert_eq!(err.kind, NetworkErrorKind::Malformed);
    }

    #[tokio::test]
    async fn test_error_detail_is_preferred() {
        let app = Router::new()
            .route(
                "/incidents",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "Project is closed"})),
                    )
                }),
            )
            .route(
                "/tasks",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let client = serve(app).await;

        let err = client
            .create::<Record>(ResourceKind::Incident, Payload::Json(Map::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, NetworkErrorKind::Status(400));
        assert_eq!(err.message, "Project is closed");

        let err = client.list::<Task>(ResourceKind::Task).await.unwrap_err();
        assert_eq!(err.kind, NetworkErrorKind::Status(500));
        assert_eq!(err.message, "Request failed with status 500");
    }

    #[tokio::test]
    async fn test_create_sends_json_and_token() {
        let app = Router::new().route(
            "/messages",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({"data": {"id": 11, "subject": body["subject"], "auth": auth}}))
            }),
        );
        let client = serve(app).await.with_token("secret");

        let mut fields = Map::new();
        fields.insert("subject".to_string(), json!("Delivery"));
        let created: Record = client
            .create(ResourceKind::Message, Payload::Json(fields))
            .await
            .unwrap();

        assert_eq!(created.id, ResourceId::Int(11));
        assert_eq!(created.get("subject"), Some(&json!("Delivery")));
        assert_eq!(created.get("auth"), Some(&json!("Token secret")));
    }

    #[tokio::test]
    async fn test_create_multipart_upload() {
        let app = Router::new().route(
            "/documents",
            post(|mut multipart: Multipart| async move {
                let mut title = String::new();
                let mut file_name = String::new();
                let mut size = 0;
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    match name.as_str() {
                        "title" => title = field.text().await.unwrap(),
                        "file" => {
                            file_name = field.file_name().unwrap_or_default().to_string();
                            size = field.bytes().await.unwrap().len();
                        }
                        _ => {}
                    }
                }
                Json(json!({
                    "id": 4,
                    "name": title,
                    "type": "permit",
                    "file": format!("/media/{}?size={}", file_name, size),
                }))
            }),
        );
        let client = serve(app).await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("permit.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let file = FileHandle::from_path(&path).unwrap();

        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("Street permit"));
        fields.insert("project".to_string(), Value::Null);
        let doc: Document = client
            .create(ResourceKind::Document, Payload::Multipart { fields, file })
            .await
            .unwrap();

        assert_eq!(doc.title, "Street permit");
        assert_eq!(doc.document_type, "permit");
        assert_eq!(doc.file_url.as_deref(), Some("/media/permit.pdf?size=8"));
    }

    #[tokio::test]
    async fn test_create_missing_attachment() {
        let client = serve(Router::new()).await;
        let file = FileHandle {
            uri: "file:///nonexistent/plan.pdf".to_string(),
            name: "plan.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 0,
        };

        let err = client
            .create::<Record>(
                ResourceKind::Document,
                Payload::Multipart {
                    fields: Map::new(),
                    file,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, NetworkErrorKind::Attachment);
    }

    #[tokio::test]
    async fn test_update_patches_by_id() {
        let app = Router::new().route(
            "/purchase-orders/{id}",
            patch(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                Json(json!({"id": id, "status": body["status"], "total_amount": 90}))
            }),
        );
        let client = serve(app).await;

        let mut patch_body = Map::new();
        patch_body.insert("status".to_string(), json!("approved"));
        let order: PurchaseOrder = client
            .update(ResourceKind::PurchaseOrder, &ResourceId::Int(3), patch_body)
            .await
            .unwrap();

        assert_eq!(order.id, ResourceId::Int(3));
        assert_eq!(order.status, "approved");
    }

    #[tokio::test]
    async fn test_login() {
        let app = Router::new().route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "hunter2" {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "access": "jwt-token",
                            "user": {"id": 2, "username": body["username"], "role": "worker"}
                        })),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"detail": "Invalid credentials"})),
                    )
                }
            }),
        );
        let client = serve(app).await;

        let login = client.login("jsmith", "hunter2").await.unwrap();
        assert_eq!(login.token, "jwt-token");
        assert_eq!(login.user.username, "jsmith");
        assert_eq!(login.user.role.as_deref(), Some("worker"));

        let err = client.login("jsmith", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(ApiOptions {
            base_url: format!("http://{}", addr),
            ..ApiOptions::default()
        })
        .unwrap();
        let err = client.list::<Task>(ResourceKind::Task).await.unwrap_err();
        assert_eq!(err.kind, NetworkErrorKind::Connect);
    }
}
