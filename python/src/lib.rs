//! deflate-stream-python
//!
//! Python bindings for deflate-stream-core (PyO3).

use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

mod ffi;

/// Environment variable holding the log filter, e.g. `RUST_DEFLATE_LOG=debug`.
const LOG_ENV: &str = "RUST_DEFLATE_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed by another extension.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Python module entry point
#[pymodule]
fn rust_deflate(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    init_logging();
    ffi::register(py, m)?;
    Ok(())
}
