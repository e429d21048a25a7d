use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Level used when `RUST_LOG` is not set.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr fmt subscriber. `RUST_LOG` directives take precedence over `-v`.
pub fn init(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose).parse()?)
        .from_env_lossy();

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry().with(fmt_layer).with(filter).init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(9), "trace");
    }
}
