pub mod logging;
pub mod request_id;

pub use logging::init_tracing;
pub use request_id::{extract_bearer_token, extract_request_id, RequestIdExt, REQUEST_ID_HEADER};
