//! Diagnostics on stderr via `tracing`. Stdout carries only the listing.

use std::error::Error;
use std::io;
use tracing_subscriber::EnvFilter;

/// Filter directives: warnings only by default; debug for this crate with `--verbose`.
///
/// HTTP internals stay at info even when verbose.
pub fn filter_directives(verbose: bool) -> &'static str {
    if verbose {
        "info,mastofollows=debug,hyper=info,reqwest=info"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Call once, before the first request.
pub fn init_logging(verbose: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_new(filter_directives(verbose))?;
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_parse() {
        assert!(EnvFilter::try_new(filter_directives(false)).is_ok());
        assert!(EnvFilter::try_new(filter_directives(true)).is_ok());
    }
}
