//! An interface to the crate's internal logging facilities. Logging is not to
//! be confused with _reporting_: reports record per-day model output, log
//! messages describe what the engine itself is doing.
//!
//! This module (re)exports the five logging macros: `error!`, `warn!`,
//! `info!`, `debug!` and `trace!` where `error!` represents the
//! highest-priority log messages and `trace!` the lowest.
//!
//! Logging is _disabled_ by default. It can be controlled programmatically:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level)`: enables only messages with priority at least
//!    `level`
//!
//! In addition, per-module filtering can be configured with
//! `set_module_filter()` / `set_module_filters()` and
//! `remove_module_filter()`.

pub use log::{debug, error, info, trace, warn, LevelFilter};

use log4rs::append::console::ConsoleAppender;
use log4rs::config::runtime::ConfigBuilder;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use std::sync::{LazyLock, Mutex, MutexGuard};

use crate::hashing::HashMap;

// Logging disabled unless explicitly enabled.
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;
const DEFAULT_LOG_PATTERN: &str = "[{d(%Y-%m-%d %H:%M:%S)} {h({l})} {M}] {m}{n}";

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// Holds the logging configuration: the global level, per-module level
/// overrides, and a handle to the installed logger. Because loggers are
/// globally installed, only one instance of this struct exists; the public
/// API are free functions that lock the singleton.
struct LogConfiguration {
    global_log_level: LevelFilter,
    module_filters: HashMap<String, LevelFilter>,
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_filters: HashMap::default(),
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    fn set_config(&mut self) {
        let stdout: ConsoleAppender = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
            .build();
        let mut config: ConfigBuilder =
            Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));

        for (module, level) in &self.module_filters {
            config = config.logger(Logger::builder().build(module.clone(), *level));
        }

        // The `Root` determines the global log level.
        let root = Root::builder()
            .appender("stdout")
            .build(self.global_log_level);
        let new_config = match config.build(root) {
            Err(e) => {
                panic!("failed to build logging config: {e}");
            }
            Ok(config) => config,
        };

        match self.root_handle {
            Some(ref mut handle) => {
                handle.set_config(new_config);
            }
            None => {
                self.root_handle = Some(log4rs::init_config(new_config).unwrap());
            }
        }
    }
}

fn configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("logging mutex poisoned")
}

/// Enables all log messages.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables all log messages.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Enables only log messages with priority at least `level`.
pub fn set_log_level(level: LevelFilter) {
    let mut configuration = configuration();
    configuration.global_log_level = level;
    configuration.set_config();
}

/// Sets the log level for a single module path (e.g. `"epigrid::sim"`).
pub fn set_module_filter(module: &str, level: LevelFilter) {
    let mut configuration = configuration();
    configuration
        .module_filters
        .insert(module.to_string(), level);
    configuration.set_config();
}

/// Sets log levels for several module paths at once.
pub fn set_module_filters(filters: &[(&str, LevelFilter)]) {
    let mut configuration = configuration();
    for (module, level) in filters {
        configuration
            .module_filters
            .insert((*module).to_string(), *level);
    }
    configuration.set_config();
}

/// Removes a per-module level override.
pub fn remove_module_filter(module: &str) {
    let mut configuration = configuration();
    configuration.module_filters.remove(module);
    configuration.set_config();
}
