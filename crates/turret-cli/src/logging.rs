//! Subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Install the global subscriber writing to stderr
///
/// `RUST_LOG` wins over `default_level`.
pub fn init(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
