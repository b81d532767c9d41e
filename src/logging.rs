//! Tracing setup for the binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a `-v` count; `RUST_LOG` takes precedence
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "mtga_weights=warn,warn",
        1 => "mtga_weights=info,warn",
        2 => "mtga_weights=debug,info",
        _ => "mtga_weights=trace,debug",
    }
}

/// Install a compact stderr subscriber
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filters_parse() {
        for v in 0..4 {
            assert!(default_filter(v).parse::<EnvFilter>().is_ok());
        }
    }

    #[test]
    fn test_init_twice() {
        init(0);
        init(3);
    }
}
