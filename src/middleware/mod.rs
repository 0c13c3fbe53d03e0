pub mod metrics;
pub mod request_id;
pub mod secret_auth;

pub use metrics::track_http_metrics;
pub use request_id::{request_id_middleware, RequestId};
pub use secret_auth::require_debug_key;
