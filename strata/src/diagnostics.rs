//! Explicit logging handle.
//!
//! Library code emits `tracing` events and never installs a global
//! subscriber. Callers build a [`Diagnostics`] value and the processor and
//! batch runner scope their work with it, so two handles with different
//! verbosity can coexist in one process.

use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Subscriber used while processing, plus the level it was built for.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    dispatch: Dispatch,
    level: LevelFilter,
}

impl Diagnostics {
    /// Build a handle that logs to stderr.
    ///
    /// `quiet` selects the error level and `verbose` the debug level;
    /// otherwise info is used. `quiet` wins when both are set. A `RUST_LOG`
    /// value in the environment overrides the chosen level.
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let level = Self::level_for(verbose, quiet);
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
            level,
        }
    }

    /// A handle that discards every event.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            dispatch: Dispatch::none(),
            level: LevelFilter::OFF,
        }
    }

    /// Level selected from the verbosity flags.
    #[must_use]
    pub const fn level(&self) -> LevelFilter {
        self.level
    }

    /// Run `f` with this handle's subscriber as the thread default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    const fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
        if quiet {
            LevelFilter::ERROR
        } else if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(false, false)
    }
}
