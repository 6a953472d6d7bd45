pub mod assembler;
pub mod batch;
pub mod config;
pub mod diagram;
pub mod distance;
pub mod error;
pub mod job_index;
pub mod languages;
pub mod matrix_file;
pub mod pair_index;
pub mod parameters;
pub mod record;
pub mod result_store;
pub mod worker;

pub use error::*;

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(service = service_name, "tracing initialised");
    }
}
