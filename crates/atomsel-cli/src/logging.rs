use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
};

/// Maps `-v`/`-q` to the console level; quiet keeps errors only.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber: a compact stderr layer and, with
/// `log_file`, a plain-text file layer that also records thread ids.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(path).map_err(CliError::Io)?;
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(file_layer).try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install the global logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomsel::core::models::atom::Atom;
    use atomsel::core::models::builder::AtomicSystemBuilder;
    use atomsel::engine::evaluator::Evaluator;
    use nalgebra::Point3;
    use serial_test::serial;
    use std::path::PathBuf;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
        assert_eq!(level_filter(0, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!("This is a warning");
        info!("This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn library_events_reach_a_file_layer() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::DEBUG)
            .with(file_layer);

        let mut builder = AtomicSystemBuilder::new();
        builder
            .add_atom(Atom::new("CA", "ALA", 1, "A", Point3::origin()))
            .add_atom(Atom::new("OW", "HOH", 2, "W", Point3::new(2.0, 0.0, 0.0)));
        let system = builder.build().unwrap();

        tracing::subscriber::with_default(subscriber, || {
            Evaluator::new()
                .select("within 3 of water", &system)
                .unwrap();
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Building spatial index."));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn reusing_a_larger_radius_index_is_traced() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("reuse.log");

        let file = File::create(&log_path).unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::DEBUG)
            .with(fmt::layer().with_writer(file).with_ansi(false));

        let mut builder = AtomicSystemBuilder::new();
        builder
            .add_atom(Atom::new("CA", "ALA", 1, "A", Point3::origin()))
            .add_atom(Atom::new("OW", "HOH", 2, "W", Point3::new(2.0, 0.0, 0.0)));
        let system = builder.build().unwrap();

        let evaluator = Evaluator::new();
        tracing::subscriber::with_default(subscriber, || {
            evaluator.select("within 50 of water", &system).unwrap();
            let mask = evaluator.select("within 1 of water", &system).unwrap();
            assert_eq!(mask.indices(), vec![1]);
        });
        assert_eq!(evaluator.index_rebuilds(), 1);

        let content = std::fs::read_to_string(log_path).unwrap();
        assert_eq!(content.matches("Building spatial index.").count(), 1);
        assert!(content.contains("Reusing spatial index built for a larger radius."));
        assert!(content.contains("built_radius=50"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(&invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
