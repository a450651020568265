use flexi_logger::{colored_default_format, FlexiLoggerError, Logger, LoggerHandle};

/// Starts stderr logging, honouring `RUST_LOG` and falling back to the
/// given level. The handle must stay alive for the lifetime of the program
/// or buffered records are lost.
pub fn init(default_spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec)?
        .format(colored_default_format)
        .start()
}
