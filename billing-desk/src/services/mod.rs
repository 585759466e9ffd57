pub mod backend;
pub mod bill_store;
pub mod metrics;
pub mod receipt;

pub use backend::{BillingBackend, CallContext, HttpBillingBackend, ProfileResponse};
pub use bill_store::{spawn_sweeper, BillStore, SharedDraft};
pub use metrics::{get_metrics, init_metrics};
pub use receipt::render_receipt;
