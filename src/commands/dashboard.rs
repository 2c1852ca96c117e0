use clap::Args;

use sitesync_core::models::{
    Equipment, Incident, Inspection, Message, Project, PurchaseOrder, Task,
};
use sitesync_core::{
    summarize, DashboardData, LoadGroup, Record, ResourceKind, ResourceSync, Role, Session,
};

use super::{api_client, OutputFormat};
use crate::config::Config;

/// Show the dashboard for a role
#[derive(Args)]
pub struct DashboardCommand {
    /// Role (admin, project_manager, foreman, worker, safety_officer, quality_inspector).
    /// Defaults to the signed-in user's role.
    role: Option<Role>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl DashboardCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = Session::new(config.session_store());
        let client = api_client(config, &session)?;
        let user = session.user()?;

        let role = match (self.role, user.as_ref().and_then(|u| u.role.as_deref())) {
            (Some(role), _) => role,
            (None, Some(stored)) => stored.parse::<Role>()?,
            (None, None) => return Err("No role given and no signed-in user role.".into()),
        };

        let projects = ResourceSync::<Project>::new("projects");
        let tasks = ResourceSync::<Task>::new("tasks");
        let purchase_orders = ResourceSync::<PurchaseOrder>::new("purchase-orders");
        let incidents = ResourceSync::<Incident>::new("incidents");
        let inspections = ResourceSync::<Inspection>::new("inspections");
        let equipment = ResourceSync::<Equipment>::new("equipment");
        let messages = ResourceSync::<Message>::new("messages");
        let material_requests = ResourceSync::<Record>::new("material-requests");
        let users = ResourceSync::<Record>::new("users");

        let client = &client;
        let mut group = LoadGroup::new();
        for &kind in role.kinds() {
            group = match kind {
                ResourceKind::Project => group.stage(&projects, move || client.list::<Project>(kind)),
                ResourceKind::Task => group.stage(&tasks, move || client.list::<Task>(kind)),
                ResourceKind::PurchaseOrder => group.stage(&purchase_orders, move || {
                    client.list::<PurchaseOrder>(kind)
                }),
                ResourceKind::Incident => {
                    group.stage(&incidents, move || client.list::<Incident>(kind))
                }
                ResourceKind::Inspection => {
                    group.stage(&inspections, move || client.list::<Inspection>(kind))
                }
                ResourceKind::Equipment => {
                    group.stage(&equipment, move || client.list::<Equipment>(kind))
                }
                ResourceKind::Message => {
                    group.stage(&messages, move || client.list::<Message>(kind))
                }
                ResourceKind::MaterialRequest => {
                    group.stage(&material_requests, move || client.list::<Record>(kind))
                }
                ResourceKind::User => group.stage(&users, move || client.list::<Record>(kind)),
                _ => group,
            };
        }
        group.run().await?;

        let data = DashboardData {
            projects: projects.items(),
            tasks: tasks.items(),
            purchase_orders: purchase_orders.items(),
            incidents: incidents.items(),
            inspections: inspections.items(),
            equipment: equipment.items(),
            messages: messages.items(),
            material_requests: material_requests.items(),
            users: users.items(),
        };
        let today = chrono::Local::now().date_naive();
        let current_user = user.as_ref().map(|u| &u.id);
        let stats = summarize(role, &data, current_user, today);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            OutputFormat::Text => {
                let title = format!("Dashboard: {}", role);
                println!("{}", title);
                println!("{}\n", "=".repeat(title.len()));
                for stat in &stats {
                    println!("{:<28}  {}", stat.label, stat.value);
                }
            }
        }
        Ok(())
    }
}
