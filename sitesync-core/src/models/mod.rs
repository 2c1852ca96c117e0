mod de;
mod document;
mod equipment;
mod incident;
mod inspection;
mod message;
mod project;
mod purchase_order;
mod task;

pub use document::Document;
pub use equipment::Equipment;
pub use incident::{Incident, Severity};
pub use inspection::Inspection;
pub use message::Message;
pub use project::Project;
pub use purchase_order::PurchaseOrder;
pub use task::Task;
