use clap::Args;
use std::path::{Path, PathBuf};

use sitesync_core::{
    ApiClient, FileHandle, FormDraft, Record, ResourceKind, ResourceSync, Session, SessionStore,
};

use super::{api_client, load_references, parse_assignments, print_record, OutputFormat};
use crate::config::Config;

/// Create a record from field values
#[derive(Args)]
pub struct CreateCommand {
    /// Resource kind (projects, tasks, incidents, ...)
    kind: ResourceKind,

    /// Field value as field=value (can be repeated)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    values: Vec<String>,

    /// File to upload with the record (documents)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl CreateCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = Session::new(config.session_store());
        let client = api_client(config, &session)?;
        let created = submit(
            &client,
            &session,
            self.kind,
            &self.values,
            self.file.as_deref(),
        )
        .await?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&created)?);
            }
            OutputFormat::Text => {
                println!("Created {}:", self.kind);
                print_record(&created);
            }
        }
        Ok(())
    }
}

/// Fills a draft, stamps the signed-in user, validates against freshly loaded
/// reference sets and posts it.
async fn submit<S: SessionStore>(
    client: &ApiClient,
    session: &Session<S>,
    kind: ResourceKind,
    values: &[String],
    file: Option<&Path>,
) -> Result<Record, Box<dyn std::error::Error>> {
    let mut draft = FormDraft::new(kind.schema());
    for (field, value) in parse_assignments(values)? {
        draft.set(&field, value)?;
    }
    if let Some(field) = kind.user_field() {
        let user = session
            .current_user_id()?
            .ok_or("Not logged in. Run 'sitesync auth login' first.")?;
        draft.set(field, user.to_string())?;
    }
    if let Some(path) = file {
        draft.attach(FileHandle::from_path(path)?);
    }

    let refs = load_references(client, kind).await?;
    let sync = ResourceSync::<Record>::new(kind.endpoint());
    let created = sync
        .create(
            &mut draft,
            |d| d.validate(&refs),
            |payload| client.create::<Record>(kind, payload),
        )
        .await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use sitesync_core::{ApiOptions, MemorySessionStore, ResourceId, SessionUser};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn serve(posts: Arc<AtomicUsize>) -> ApiClient {
        let app = Router::new()
            .route(
                "/projects",
                get(|| async { Json(json!([{"id": 8, "name": "Tower A"}])) }),
            )
            .route(
                "/incidents",
                post(move |Json(mut body): Json<Value>| {
                    posts.fetch_add(1, Ordering::SeqCst);
                    async move {
                        body["id"] = json!(21);
                        Json(body)
                    }
                }),
            );
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

    fn signed_in() -> Session<MemorySessionStore> {
        let mut session = Session::new(MemorySessionStore::new());
        let user = SessionUser {
            id: ResourceId::Int(5),
            username: "safety".to_string(),
            role: Some("safety_officer".to_string()),
            first_name: None,
            last_name: None,
            email: None,
        };
        session.sign_in("token-123", &user).unwrap();
        session
    }

    fn incident(project: &str) -> Vec<String> {
        vec![
            "title=Scaffold gap".to_string(),
            "description=Missing toe board on level 3".to_string(),
            format!("project={}", project),
            "severity=high".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_submit_stamps_current_user() {
        let posts = Arc::new(AtomicUsize::new(0));
        let client = serve(posts.clone()).await;

        let created = submit(
            &client,
            &signed_in(),
            ResourceKind::Incident,
            &incident("8"),
            None,
        )
        .await
        .unwrap();

        assert_eq!(created.id, ResourceId::Int(21));
        assert_eq!(created.get("reported_by"), Some(&json!(5)));
        assert_eq!(created.get("project"), Some(&json!(8)));
        assert_eq!(created.get("status"), Some(&json!("open")));
        assert_eq!(posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_requires_session() {
        let posts = Arc::new(AtomicUsize::new(0));
        let client = serve(posts.clone()).await;
        let session = Session::new(MemorySessionStore::new());

        let err = submit(&client, &session, ResourceKind::Incident, &incident("8"), None)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Not logged in"));
        assert_eq!(posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_validates_against_loaded_references() {
        let posts = Arc::new(AtomicUsize::new(0));
        let client = serve(posts.clone()).await;

        let err = submit(
            &client,
            &signed_in(),
            ResourceKind::Incident,
            &incident("99"),
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Please select a valid project");
        assert_eq!(posts.load(Ordering::SeqCst), 0);
    }
}
