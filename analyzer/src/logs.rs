//! Pipeline progress logging.
//!
//! The `log_*` helpers turn progress messages into [`tracing`] events so the
//! binary (or any embedding application) decides where they go. Success
//! messages are info-level events tagged with `outcome = "success"`.

/// Log level of a progress message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single progress message
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for sub-steps
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message prefixed with its indentation.
    pub fn render(&self) -> String {
        format!("{}{}", "  ".repeat(self.indent as usize), self.message)
    }
}

/// Emit a progress message as a tracing event.
pub fn emit(entry: &LogEntry) {
    let message = entry.render();
    match entry.level {
        LogLevel::Info => tracing::info!("{}", message),
        LogLevel::Success => tracing::info!(outcome = "success", "{}", message),
        LogLevel::Warning => tracing::warn!("{}", message),
        LogLevel::Error => tracing::error!("{}", message),
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    emit(&LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    emit(&LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    emit(&LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    emit(&LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    emit(&LogEntry::info(msg).with_indent(indent));
}

/// Install the global `tracing` subscriber.
///
/// `NOAEL_RANK_LOG` (an `EnvFilter` directive) wins over the flags.
pub fn init_tracing(quiet: bool, verbose: bool) -> Result<(), String> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("NOAEL_RANK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {}", e))
}
