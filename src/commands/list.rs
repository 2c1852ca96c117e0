use clap::Args;
use std::path::{Path, PathBuf};

use sitesync_core::normalize::decode_list;
use sitesync_core::{LoadOutcome, Record, ResourceKind, ResourceSync, SeedFallback, Session};

use super::{api_client, print_records, OutputFormat};
use crate::config::Config;

/// List the records of one resource kind
#[derive(Args)]
pub struct ListCommand {
    /// Resource kind (projects, tasks, purchase-orders, ...)
    kind: ResourceKind,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show records from this JSON file if the server cannot be reached
    #[arg(long, value_name = "FILE")]
    offline_seed: Option<PathBuf>,
}

impl ListCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = Session::new(config.session_store());
        let client = api_client(config, &session)?;

        let mut sync = ResourceSync::<Record>::new(self.kind.endpoint());
        if let Some(path) = &self.offline_seed {
            sync = sync.with_fallback(SeedFallback::Seed(read_seed(path, self.kind)?));
        }

        let kind = self.kind;
        match sync.load_all(|| client.list::<Record>(kind)).await? {
            LoadOutcome::Seeded { error, .. } => {
                eprintln!("Warning: {}. Showing offline data.", error);
            }
            LoadOutcome::Fetched { .. } | LoadOutcome::Discarded => {}
        }

        let records = sync.items();
        if records.is_empty() {
            println!("No {} found", self.kind);
            return Ok(());
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            OutputFormat::Text => {
                print_records(self.kind, &records);
                println!("\nTotal: {} record(s)", records.len());
            }
        }
        Ok(())
    }
}

/// Reads seed records in any shape a list endpoint may answer with.
fn read_seed(path: &Path, kind: ResourceKind) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read seed file '{}': {}", path.display(), e))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse seed file '{}': {}", path.display(), e))?;
    Ok(decode_list(value, kind.aliases())?.unwrap_or_default())
}
