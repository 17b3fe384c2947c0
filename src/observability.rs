//! Tracing subscriber setup shared by the binary, benches and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    init_tracing_with("info")
}

pub fn init_tracing_with(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let _ = init_tracing_with("off");
        assert!(!init_tracing());
    }
}
