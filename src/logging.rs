//! Logging configuration using tracing
//!
//! Structured logging to stderr, filtered through the RUST_LOG environment variable.

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Filter used when RUST_LOG is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing subscriber
///
/// Sets up structured logging with:
/// - Filtering via RUST_LOG (defaults to "warn" so CLI output stays quiet)
/// - Pretty formatted output to stderr
///
/// # Example RUST_LOG values
/// - `RUST_LOG=info` - Show the server address and each submission
/// - `RUST_LOG=repodeps=debug` - Debug level for this crate only
/// - `RUST_LOG=repodeps=debug,tower=info` - Different levels per crate
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init() -> crate::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(output_layer(std::io::stderr, true))
        .try_init()
        .map_err(|e| crate::RepoDepsError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init();
}

/// Pretty event formatting with target and line number, written to `writer`
fn output_layer<S, W>(writer: W, ansi: bool) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true)
        .pretty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            BufferWriter(Arc::clone(&self.0))
        }
    }

    impl io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_init_test_helper() {
        // Safe to call repeatedly
        init_test();
        init_test();
    }

    #[test]
    fn test_structured_logging() {
        let sink = SharedBuffer::default();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(DEFAULT_FILTER))
            .with(output_layer(sink.clone(), false));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(records = 3, "parsed manifest");
            tracing::warn!(
                repository = "core",
                field = "branch",
                "Missing override"
            );
        });

        let output = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();

        // Only the warning passes the default filter
        assert!(output.contains("WARN"));
        assert!(output.contains("Missing override"));
        assert!(output.contains("repository: \"core\""));
        assert!(output.contains("field: \"branch\""));
        assert!(output.contains("repodeps::logging::tests"));
        assert!(!output.contains("parsed manifest"));
    }
}
