use clap::Args;

use sitesync_core::{Record, ResourceId, ResourceKind, ResourceSync, Session};

use super::{api_client, parse_assignments, print_record, OutputFormat};
use crate::config::Config;

/// Update fields of an existing record
#[derive(Args)]
pub struct UpdateCommand {
    /// Resource kind (projects, tasks, purchase-orders, ...)
    kind: ResourceKind,

    /// Record ID
    id: ResourceId,

    /// New field value as field=value (can be repeated)
    #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
    values: Vec<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl UpdateCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = Session::new(config.session_store());
        let client = api_client(config, &session)?;
        let kind = self.kind;

        let pairs = parse_assignments(&self.values)?;
        let patch = kind
            .schema()
            .patch(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        let sync = ResourceSync::<Record>::new(kind.endpoint());
        sync.load_all(|| client.list::<Record>(kind)).await?;
        if sync.get(&self.id).is_none() {
            tracing::warn!(resource = %kind, id = %self.id, "record not in loaded list");
        }

        let updated = sync
            .update(self.id.clone(), patch, |id, patch| async move {
                client.update::<Record>(kind, &id, patch).await
            })
            .await?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            }
            OutputFormat::Text => {
                println!("Updated {} {}:", kind, updated.id);
                print_record(&updated);
            }
        }
        Ok(())
    }
}
