//! Role-specific dashboard statistics.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::kind::{ResourceKind, ROLES};
use crate::models::{Equipment, Incident, Inspection, Message, Project, PurchaseOrder, Task};
use crate::resource::{Record, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    ProjectManager,
    Foreman,
    Worker,
    SafetyOfficer,
    QualityInspector,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::ProjectManager,
        Role::Foreman,
        Role::Worker,
        Role::SafetyOfficer,
        Role::QualityInspector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::Foreman => "foreman",
            Role::Worker => "worker",
            Role::SafetyOfficer => "safety_officer",
            Role::QualityInspector => "quality_inspector",
        }
    }

    /// Collections this role's dashboard is computed from.
    pub fn kinds(&self) -> &'static [ResourceKind] {
        match self {
            Role::Admin => &[
                ResourceKind::Project,
                ResourceKind::User,
                ResourceKind::Incident,
                ResourceKind::PurchaseOrder,
            ],
            Role::ProjectManager => &[
                ResourceKind::Project,
                ResourceKind::Task,
                ResourceKind::PurchaseOrder,
            ],
            Role::Foreman => &[
                ResourceKind::Task,
                ResourceKind::MaterialRequest,
                ResourceKind::Equipment,
            ],
            Role::Worker => &[ResourceKind::Task, ResourceKind::Message],
            Role::SafetyOfficer => &[ResourceKind::Incident],
            Role::QualityInspector => &[ResourceKind::Inspection],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid role '{}'. Valid options: {}",
                    s,
                    ROLES.join(", ")
                )
            })
    }
}

/// Collections a dashboard may draw from. Unloaded ones stay empty.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub incidents: Vec<Incident>,
    pub inspections: Vec<Inspection>,
    pub equipment: Vec<Equipment>,
    pub messages: Vec<Message>,
    pub material_requests: Vec<Record>,
    pub users: Vec<Record>,
}

/// One labelled figure on a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
}

impl Stat {
    fn count(label: &'static str, n: usize) -> Self {
        Self {
            label,
            value: n.to_string(),
        }
    }
}

/// Computes the stats shown on `role`'s dashboard.
///
/// Figures that depend on the signed-in user count nothing when `current_user` is `None`.
pub fn summarize(
    role: Role,
    data: &DashboardData,
    current_user: Option<&ResourceId>,
    today: NaiveDate,
) -> Vec<Stat> {
    let mine = |owner: &Option<ResourceId>| current_user.is_some() && owner.as_ref() == current_user;

    match role {
        Role::Admin => vec![
            Stat::count("Projects", data.projects.len()),
            Stat::count(
                "Active projects",
                data.projects.iter().filter(|p| p.is_active()).count(),
            ),
            Stat::count("Users", data.users.len()),
            Stat::count(
                "Open incidents",
                data.incidents.iter().filter(|i| i.is_open()).count(),
            ),
            Stat::count(
                "Pending purchase orders",
                data.purchase_orders.iter().filter(|po| po.is_pending()).count(),
            ),
        ],
        Role::ProjectManager => {
            let committed: f64 = data
                .purchase_orders
                .iter()
                .filter(|po| po.is_committed())
                .filter_map(|po| po.total_amount)
                .sum();
            vec![
                Stat::count(
                    "Active projects",
                    data.projects.iter().filter(|p| p.is_active()).count(),
                ),
                Stat::count(
                    "Open tasks",
                    data.tasks.iter().filter(|t| !t.is_completed()).count(),
                ),
                Stat::count(
                    "Overdue tasks",
                    data.tasks.iter().filter(|t| t.is_overdue(today)).count(),
                ),
                Stat::count(
                    "Pending purchase orders",
                    data.purchase_orders.iter().filter(|po| po.is_pending()).count(),
                ),
                Stat {
                    label: "Committed spend",
                    value: format!("{:.2}", committed),
                },
            ]
        }
        Role::Foreman => vec![
            Stat::count(
                "Open tasks",
                data.tasks.iter().filter(|t| !t.is_completed()).count(),
            ),
            Stat::count(
                "Overdue tasks",
                data.tasks.iter().filter(|t| t.is_overdue(today)).count(),
            ),
            Stat::count(
                "Pending material requests",
                data.material_requests
                    .iter()
                    .filter(|r| r.get("status").and_then(|s| s.as_str()) == Some("pending"))
                    .count(),
            ),
            Stat::count(
                "Equipment in use",
                data.equipment.iter().filter(|e| e.status == "in_use").count(),
            ),
        ],
        Role::Worker => vec![
            Stat::count(
                "My open tasks",
                data.tasks
                    .iter()
                    .filter(|t| mine(&t.assigned_to) && !t.is_completed())
                    .count(),
            ),
            Stat::count(
                "My overdue tasks",
                data.tasks
                    .iter()
                    .filter(|t| mine(&t.assigned_to) && t.is_overdue(today))
                    .count(),
            ),
            Stat::count(
                "Unread messages",
                current_user.map_or(0, |user| {
                    data.messages.iter().filter(|m| m.is_unread_by(user)).count()
                }),
            ),
        ],
        Role::SafetyOfficer => vec![
            Stat::count("Incidents", data.incidents.len()),
            Stat::count(
                "Open incidents",
                data.incidents.iter().filter(|i| i.is_open()).count(),
            ),
            Stat::count(
                "Serious open incidents",
                data.incidents
                    .iter()
                    .filter(|i| i.is_open() && i.is_serious())
                    .count(),
            ),
            Stat::count(
                "Reported by me",
                data.incidents.iter().filter(|i| mine(&i.reported_by)).count(),
            ),
        ],
        Role::QualityInspector => {
            let with_result =
                |result: &str| data.inspections.iter().filter(|i| i.result == result).count();
            vec![
                Stat::count("Scheduled", with_result("pending")),
                Stat::count("Passed", with_result("passed")),
                Stat::count("Failed", with_result("failed")),
                Stat::count(
                    "Assigned to me",
                    data.inspections
                        .iter()
                        .filter(|i| mine(&i.inspector) && i.result == "pending")
                        .count(),
                ),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn decode<T: serde::de::DeserializeOwned>(values: Value) -> Vec<T> {
        serde_json::from_value(values).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn value(stats: &[Stat], label: &str) -> String {
        stats
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.value.clone())
            .unwrap_or_else(|| panic!("missing stat {}", label))
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("project-manager").unwrap(), Role::ProjectManager);
        assert_eq!(Role::from_str("Safety Officer").unwrap(), Role::SafetyOfficer);
        assert!(Role::from_str("janitor").is_err());
        for role in Role::ALL {
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn test_project_manager_stats() {
        let data = DashboardData {
            projects: decode(json!([
                {"id": 1, "status": "active"},
                {"id": 2, "status": "completed"}
            ])),
            tasks: decode(json!([
                {"id": 1, "status": "pending", "due_date": "2025-05-01"},
                {"id": 2, "status": "completed", "due_date": "2025-05-01"},
                {"id": 3, "status": "in_progress", "due_date": "2025-07-01"}
            ])),
            purchase_orders: decode(json!([
                {"id": 1, "status": "approved", "total_amount": "100.50"},
                {"id": 2, "status": "delivered", "total_amount": 20},
                {"id": 3, "status": "pending", "total_amount": 999}
            ])),
            ..DashboardData::default()
        };

        let stats = summarize(Role::ProjectManager, &data, None, today());
        assert_eq!(value(&stats, "Active projects"), "1");
        assert_eq!(value(&stats, "Open tasks"), "2");
        assert_eq!(value(&stats, "Overdue tasks"), "1");
        assert_eq!(value(&stats, "Pending purchase orders"), "1");
        assert_eq!(value(&stats, "Committed spend"), "120.50");
    }

    #[test]
    fn test_worker_stats_are_personal() {
        let me = ResourceId::Int(5);
        let data = DashboardData {
            tasks: decode(json!([
                {"id": 1, "status": "pending", "assigned_to": 5, "due_date": "2025-05-01"},
                {"id": 2, "status": "pending", "assigned_to": {"id": 6}},
                {"id": 3, "status": "completed", "assigned_to": 5}
            ])),
            messages: decode(json!([
                {"id": 1, "recipient": 5, "is_read": false},
                {"id": 2, "recipient": 5, "is_read": true},
                {"id": 3, "recipient": 6, "is_read": false}
            ])),
            ..DashboardData::default()
        };

        let stats = summarize(Role::Worker, &data, Some(&me), today());
        assert_eq!(value(&stats, "My open tasks"), "1");
        assert_eq!(value(&stats, "My overdue tasks"), "1");
        assert_eq!(value(&stats, "Unread messages"), "1");

        let anonymous = summarize(Role::Worker, &data, None, today());
        assert_eq!(value(&anonymous, "My open tasks"), "0");
        assert_eq!(value(&anonymous, "Unread messages"), "0");
    }

    #[test]
    fn test_safety_officer_stats() {
        let data = DashboardData {
            incidents: decode(json!([
                {"id": 1, "status": "open", "severity": "critical", "reported_by": 9},
                {"id": 2, "status": "investigating", "severity": "low"},
                {"id": 3, "status": "closed", "severity": "high"}
            ])),
            ..DashboardData::default()
        };

        let stats = summarize(Role::SafetyOfficer, &data, Some(&ResourceId::Int(9)), today());
        assert_eq!(value(&stats, "Incidents"), "3");
        assert_eq!(value(&stats, "Open incidents"), "2");
        assert_eq!(value(&stats, "Serious open incidents"), "1");
        assert_eq!(value(&stats, "Reported by me"), "1");
    }

    #[test]
    fn test_foreman_and_inspector_stats() {
        let data = DashboardData {
            material_requests: decode(json!([
                {"id": 1, "status": "pending"},
                {"id": 2, "status": "approved"}
            ])),
            equipment: decode(json!([{"id": 1, "status": "in_use"}])),
            inspections: decode(json!([
                {"id": 1, "result": "pending", "inspector": 4},
                {"id": 2, "result": "failed"}
            ])),
            ..DashboardData::default()
        };

        let foreman = summarize(Role::Foreman, &data, None, today());
        assert_eq!(value(&foreman, "Pending material requests"), "1");
        assert_eq!(value(&foreman, "Equipment in use"), "1");

        let inspector = summarize(Role::QualityInspector, &data, Some(&ResourceId::Int(4)), today());
        assert_eq!(value(&inspector, "Scheduled"), "1");
        assert_eq!(value(&inspector, "Failed"), "1");
        assert_eq!(value(&inspector, "Assigned to me"), "1");
    }
}
