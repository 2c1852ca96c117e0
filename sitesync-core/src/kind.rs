//! The resource kinds exposed by the construction-management backend.
//!
//! Each kind knows its endpoint, its create form, the legacy field names the
//! backend may still send, and which field records the signed-in user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::draft::{FieldKind, FieldSpec, FormSchema};

pub const PROJECT_STATUSES: &[&str] = &["planning", "active", "on_hold", "completed"];
pub const TASK_STATUSES: &[&str] = &["pending", "in_progress", "completed"];
pub const PRIORITIES: &[&str] = &["low", "medium", "high"];
pub const REQUEST_STATUSES: &[&str] = &["pending", "approved", "rejected", "fulfilled"];
pub const PO_STATUSES: &[&str] = &["draft", "pending", "approved", "rejected", "delivered"];
pub const SEVERITIES: &[&str] = &["low", "medium", "high", "critical"];
pub const INCIDENT_STATUSES: &[&str] = &["open", "investigating", "resolved", "closed"];
pub const INSPECTION_RESULTS: &[&str] = &["pending", "passed", "failed"];
pub const DOCUMENT_TYPES: &[&str] = &["drawing", "contract", "permit", "report", "photo", "other"];
pub const EQUIPMENT_STATUSES: &[&str] = &["available", "in_use", "maintenance", "retired"];
pub const ROLES: &[&str] = &[
    "admin",
    "project_manager",
    "foreman",
    "worker",
    "safety_officer",
    "quality_inspector",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Project,
    Task,
    Material,
    MaterialRequest,
    PurchaseOrder,
    Vendor,
    Incident,
    Inspection,
    Document,
    Equipment,
    Message,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        ResourceKind::Project,
        ResourceKind::Task,
        ResourceKind::Material,
        ResourceKind::MaterialRequest,
        ResourceKind::PurchaseOrder,
        ResourceKind::Vendor,
        ResourceKind::Incident,
        ResourceKind::Inspection,
        ResourceKind::Document,
        ResourceKind::Equipment,
        ResourceKind::Message,
        ResourceKind::User,
    ];

    /// Path segment of the collection endpoint, also the name of its reference set.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ResourceKind::Project => "projects",
            ResourceKind::Task => "tasks",
            ResourceKind::Material => "materials",
            ResourceKind::MaterialRequest => "material-requests",
            ResourceKind::PurchaseOrder => "purchase-orders",
            ResourceKind::Vendor => "vendors",
            ResourceKind::Incident => "incidents",
            ResourceKind::Inspection => "inspections",
            ResourceKind::Document => "documents",
            ResourceKind::Equipment => "equipment",
            ResourceKind::Message => "messages",
            ResourceKind::User => "users",
        }
    }

    /// Field stamped with the signed-in user's id on create.
    pub fn user_field(&self) -> Option<&'static str> {
        match self {
            ResourceKind::MaterialRequest | ResourceKind::PurchaseOrder => Some("requested_by"),
            ResourceKind::Incident => Some("reported_by"),
            ResourceKind::Inspection => Some("inspector"),
            ResourceKind::Document => Some("uploaded_by"),
            ResourceKind::Message => Some("sender"),
            _ => None,
        }
    }

    /// `(canonical, legacy)` field names; the legacy name is read when the canonical one is absent.
    pub fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ResourceKind::Document => &[
                ("document_type", "type"),
                ("title", "name"),
                ("file_url", "file"),
            ],
            ResourceKind::Equipment => &[("equipment_type", "type")],
            ResourceKind::Incident => &[("incident_date", "date")],
            ResourceKind::Inspection => &[("inspection_type", "type"), ("scheduled_date", "date")],
            ResourceKind::Message => &[("body", "content")],
            ResourceKind::PurchaseOrder => &[("total_amount", "total")],
            ResourceKind::Task => &[("assigned_to", "assignee")],
            _ => &[],
        }
    }

    /// Columns shown when listing this kind.
    pub fn summary_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Project => &["name", "status", "location"],
            ResourceKind::Task => &["title", "status", "priority", "due_date"],
            ResourceKind::Material => &["name", "quantity", "unit"],
            ResourceKind::MaterialRequest => &["material", "quantity", "status"],
            ResourceKind::PurchaseOrder => &["po_number", "vendor", "status", "total_amount"],
            ResourceKind::Vendor => &["name", "contact_email", "phone"],
            ResourceKind::Incident => &["title", "severity", "status"],
            ResourceKind::Inspection => &["title", "inspection_type", "result"],
            ResourceKind::Document => &["title", "document_type", "project"],
            ResourceKind::Equipment => &["name", "equipment_type", "status"],
            ResourceKind::Message => &["subject", "sender", "is_read"],
            ResourceKind::User => &["username", "email", "role"],
        }
    }

    /// Create form for this kind.
    pub fn schema(&self) -> FormSchema {
        use FieldKind::{Choice, CurrentUser, Date, Decimal, Reference};

        let projects = Reference("projects");
        let users = Reference("users");

        match self {
            ResourceKind::Project => FormSchema::new(vec![
                FieldSpec::text("name", "Name").required(),
                FieldSpec::text("location", "Location"),
                FieldSpec::new("status", "Status", Choice(PROJECT_STATUSES))
                    .default_value("planning"),
                FieldSpec::new("start_date", "Start date", Date),
                FieldSpec::new("end_date", "End date", Date),
                FieldSpec::new("budget", "Budget", Decimal),
                FieldSpec::new("manager", "Manager", users),
            ]),
            ResourceKind::Task => FormSchema::new(vec![
                FieldSpec::text("title", "Title").required(),
                FieldSpec::text("description", "Description"),
                FieldSpec::new("project", "Project", projects).required(),
                FieldSpec::new("assigned_to", "Assignee", users),
                FieldSpec::new("status", "Status", Choice(TASK_STATUSES)).default_value("pending"),
                FieldSpec::new("priority", "Priority", Choice(PRIORITIES)).default_value("medium"),
                FieldSpec::new("due_date", "Due date", Date),
            ]),
            ResourceKind::Material => FormSchema::new(vec![
                FieldSpec::text("name", "Name").required(),
                FieldSpec::text("unit", "Unit").required(),
                FieldSpec::new("quantity", "Quantity", Decimal).required(),
                FieldSpec::new("unit_cost", "Unit cost", Decimal),
                FieldSpec::new("project", "Project", projects),
            ]),
            ResourceKind::MaterialRequest => FormSchema::new(vec![
                FieldSpec::new("material", "Material", Reference("materials")).required(),
                FieldSpec::new("quantity", "Quantity", Decimal).required(),
                FieldSpec::new("project", "Project", projects).required(),
                FieldSpec::new("needed_by", "Needed by", Date),
                FieldSpec::text("notes", "Notes"),
                FieldSpec::new("status", "Status", Choice(REQUEST_STATUSES))
                    .default_value("pending"),
                FieldSpec::new("requested_by", "Requested by", CurrentUser).required(),
            ]),
            ResourceKind::PurchaseOrder => FormSchema::new(vec![
                FieldSpec::text("po_number", "PO number").required(),
                FieldSpec::new("vendor", "Vendor", Reference("vendors")).required(),
                FieldSpec::new("project", "Project", projects).required(),
                FieldSpec::new("total_amount", "Total amount", Decimal).required(),
                FieldSpec::new("status", "Status", Choice(PO_STATUSES)).default_value("draft"),
                FieldSpec::new("order_date", "Order date", Date),
                FieldSpec::new("requested_by", "Requested by", CurrentUser).required(),
            ]),
            ResourceKind::Vendor => FormSchema::new(vec![
                FieldSpec::text("name", "Name").required(),
                FieldSpec::text("contact_email", "Contact email"),
                FieldSpec::text("phone", "Phone"),
            ]),
            ResourceKind::Incident => FormSchema::new(vec![
                FieldSpec::text("title", "Title").required(),
                FieldSpec::text("description", "Description").required(),
                FieldSpec::new("project", "Project", projects).required(),
                FieldSpec::new("severity", "Severity", Choice(SEVERITIES)).required(),
                FieldSpec::text("location", "Location"),
                FieldSpec::new("incident_date", "Incident date", Date),
                FieldSpec::new("status", "Status", Choice(INCIDENT_STATUSES)).default_value("open"),
                FieldSpec::new("reported_by", "Reported by", CurrentUser).required(),
            ]),
            ResourceKind::Inspection => FormSchema::new(vec![
                FieldSpec::text("title", "Title").required(),
                FieldSpec::new("project", "Project", projects).required(),
                FieldSpec::text("inspection_type", "Inspection type").required(),
                FieldSpec::new("scheduled_date", "Scheduled date", Date).required(),
                FieldSpec::new("result", "Result", Choice(INSPECTION_RESULTS))
                    .default_value("pending"),
                FieldSpec::text("notes", "Notes"),
                FieldSpec::new("inspector", "Inspector", CurrentUser).required(),
            ]),
            ResourceKind::Document => FormSchema::new(vec![
                FieldSpec::text("title", "Title").required(),
                FieldSpec::new("project", "Project", projects).required(),
                FieldSpec::new("document_type", "Document type", Choice(DOCUMENT_TYPES))
                    .default_value("other"),
                FieldSpec::text("description", "Description"),
                FieldSpec::new("uploaded_by", "Uploaded by", CurrentUser).required(),
            ])
            .with_attachment(),
            ResourceKind::Equipment => FormSchema::new(vec![
                FieldSpec::text("name", "Name").required(),
                FieldSpec::text("equipment_type", "Equipment type").required(),
                FieldSpec::text("serial_number", "Serial number"),
                FieldSpec::new("status", "Status", Choice(EQUIPMENT_STATUSES))
                    .default_value("available"),
                FieldSpec::new("project", "Project", projects),
                FieldSpec::new("hourly_rate", "Hourly rate", Decimal),
            ]),
            ResourceKind::Message => FormSchema::new(vec![
                FieldSpec::new("recipient", "Recipient", users).required(),
                FieldSpec::text("subject", "Subject").required(),
                FieldSpec::text("body", "Message").required(),
                FieldSpec::new("sender", "Sender", CurrentUser).required(),
            ]),
            ResourceKind::User => FormSchema::new(vec![
                FieldSpec::text("username", "Username").required(),
                FieldSpec::text("email", "Email").required(),
                FieldSpec::new("role", "Role", Choice(ROLES)).required(),
                FieldSpec::text("first_name", "First name"),
                FieldSpec::text("last_name", "Last name"),
            ]),
        }
    }

    /// Kinds whose collections back this kind's selection fields.
    pub fn reference_kinds(&self) -> Vec<ResourceKind> {
        self.schema()
            .reference_sets()
            .into_iter()
            .filter_map(|set| set.parse().ok())
            .collect()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        let kind = match normalized.as_str() {
            "project" | "projects" => ResourceKind::Project,
            "task" | "tasks" => ResourceKind::Task,
            "material" | "materials" => ResourceKind::Material,
            "material-request" | "material-requests" => ResourceKind::MaterialRequest,
            "purchase-order" | "purchase-orders" | "po" | "pos" => ResourceKind::PurchaseOrder,
            "vendor" | "vendors" => ResourceKind::Vendor,
            "incident" | "incidents" => ResourceKind::Incident,
            "inspection" | "inspections" => ResourceKind::Inspection,
            "document" | "documents" => ResourceKind::Document,
            "equipment" => ResourceKind::Equipment,
            "message" | "messages" => ResourceKind::Message,
            "user" | "users" => ResourceKind::User,
            _ => {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.endpoint()).collect();
                return Err(format!(
                    "Invalid resource kind '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                ));
            }
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            ResourceKind::from_str("purchase_orders").unwrap(),
            ResourceKind::PurchaseOrder
        );
        assert_eq!(ResourceKind::from_str("PO").unwrap(), ResourceKind::PurchaseOrder);
        assert_eq!(
            ResourceKind::from_str("Material Request").unwrap(),
            ResourceKind::MaterialRequest
        );
        assert!(ResourceKind::from_str("invoices").is_err());
    }

    #[test]
    fn test_endpoint_round_trips_through_from_str() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_str(kind.endpoint()).unwrap(), kind);
        }
    }

    #[test]
    fn test_user_field_is_in_schema() {
        for kind in ResourceKind::ALL {
            if let Some(field) = kind.user_field() {
                let spec = kind.schema();
                let spec = spec.field(field).expect("user field missing from schema");
                assert_eq!(spec.kind, FieldKind::CurrentUser);
                assert!(spec.required);
            }
        }
    }

    #[test]
    fn test_reference_kinds() {
        assert_eq!(
            ResourceKind::PurchaseOrder.reference_kinds(),
            vec![ResourceKind::Vendor, ResourceKind::Project]
        );
        assert_eq!(
            ResourceKind::MaterialRequest.reference_kinds(),
            vec![ResourceKind::Material, ResourceKind::Project]
        );
        assert!(ResourceKind::Vendor.reference_kinds().is_empty());
    }

    #[test]
    fn test_only_documents_require_attachment() {
        for kind in ResourceKind::ALL {
            assert_eq!(
                kind.schema().requires_attachment,
                kind == ResourceKind::Document
            );
        }
    }
}
