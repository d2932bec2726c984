//! Log capture for tests; `RUST_LOG=tiersplit_pdg=debug` shows analysis output

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
