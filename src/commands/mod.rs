mod auth;
mod config_cmd;
mod create;
mod dashboard;
mod list;
mod update;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use create::CreateCommand;
pub use dashboard::DashboardCommand;
pub use list::ListCommand;
pub use update::UpdateCommand;

use clap::ValueEnum;
use sitesync_core::{
    ApiClient, LoadGroup, Record, ResourceKind, ResourceSync, References, Session, SessionStore,
    SyncError,
};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Builds an API client carrying the stored token, if any.
pub fn api_client<S: SessionStore>(
    config: &Config,
    session: &Session<S>,
) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let client = ApiClient::new(config.api_options())?;
    Ok(match session.token()? {
        Some(token) => client.with_token(token),
        None => client,
    })
}

/// Splits repeated `field=value` arguments.
pub fn parse_assignments(args: &[String]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| format!("Invalid assignment '{}'. Expected field=value", arg))
        })
        .collect()
}

/// Loads every reference set `kind`'s form selects from, all or nothing.
pub async fn load_references(
    client: &ApiClient,
    kind: ResourceKind,
) -> Result<References, SyncError> {
    let kinds = kind.reference_kinds();
    let syncs: Vec<ResourceSync<Record>> = kinds
        .iter()
        .map(|k| ResourceSync::new(k.endpoint()))
        .collect();

    let mut group = LoadGroup::new();
    for (sync, reference) in syncs.iter().zip(kinds.iter().copied()) {
        group = group.stage(sync, move || client.list::<Record>(reference));
    }
    group.run().await?;

    let mut refs = References::new();
    for (sync, reference) in syncs.iter().zip(&kinds) {
        refs.insert(reference.endpoint(), &sync.items());
    }
    Ok(refs)
}

/// Prints records as a table of the kind's summary columns.
pub fn print_records(kind: ResourceKind, records: &[Record]) {
    let columns = kind.summary_fields();
    let mut header = format!("{:<8}", "ID");
    for column in columns {
        header.push_str(&format!("  {:<20}", column.to_uppercase()));
    }
    println!("{}", header.trim_end());
    println!("{}", "-".repeat(8 + columns.len() * 22));

    for record in records {
        let mut line = format!("{:<8}", record.id.to_string());
        for column in columns {
            line.push_str(&format!("  {:<20}", truncate(&record.display_field(column), 20)));
        }
        println!("{}", line.trim_end());
    }
}

/// Prints one record as `field: value` lines.
pub fn print_record(record: &Record) {
    println!("  id: {}", record.id);
    for field in record.fields.keys() {
        println!("  {}: {}", field, record.display_field(field));
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let cut: String = value.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use sitesync_core::{ApiOptions, ResourceId};

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
    fn test_parse_assignments() {
        let args = vec!["title=Pour slab".to_string(), "notes=a=b".to_string()];
        assert_eq!(
            parse_assignments(&args).unwrap(),
            vec![
                ("title".to_string(), "Pour slab".to_string()),
                ("notes".to_string(), "a=b".to_string()),
            ]
        );
        assert!(parse_assignments(&["title".to_string()]).is_err());
        assert!(parse_assignments(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[tokio::test]
    async fn test_load_references_for_purchase_orders() {
        let app = Router::new()
            .route("/vendors", get(|| async { Json(json!([{"id": 3, "name": "Acme"}])) }))
            .route("/projects", get(|| async { Json(json!({"data": [{"id": 8}]})) }));
        let client = serve(app).await;

        let refs = load_references(&client, ResourceKind::PurchaseOrder)
            .await
            .unwrap();
        assert_eq!(refs.contains("vendors", &ResourceId::Int(3)), Some(true));
        assert_eq!(refs.contains("projects", &ResourceId::Int(8)), Some(true));
        assert_eq!(refs.contains("users", &ResourceId::Int(1)), None);
    }

    #[tokio::test]
    async fn test_load_references_fails_as_a_whole() {
        let app = Router::new().route("/vendors", get(|| async { Json(json!([{"id": 3}])) }));
        let client = serve(app).await;

        let err = load_references(&client, ResourceKind::PurchaseOrder)
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
