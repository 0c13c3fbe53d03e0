pub mod auth_handler;
pub mod debug;
pub mod entries_handler;
pub mod health;
pub mod journals_handler;
pub mod metrics;
pub mod templates_handler;
pub mod users_handler;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};
