use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use std::sync::OnceLock;

/// Process-wide logging bridged into the progress display
///
/// Log records are routed through the progress area so they do not tear
/// ongoing bars.
pub struct Logger {
    multi_progress: MultiProgress,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

impl Logger {
    /// Install the logger once, a no-op afterwards
    pub fn init() -> &'static Self {
        LOGGER.get_or_init(|| {
            let logger = env_logger::Builder::from_env(
                // Nothing is logged by default, only human-friendly messages
                // Run with "RUST_LOG=info" to watch the machinery
                env_logger::Env::default().default_filter_or("off"),
            )
            .build();

            let level = logger.filter();
            let multi_progress = MultiProgress::new();

            if LogWrapper::new(multi_progress.clone(), logger)
                .try_init()
                .is_ok()
            {
                log::set_max_level(level);
            }

            Self { multi_progress }
        })
    }

    /// Progress area shared by everything that draws bars
    pub fn multi_progress() -> &'static MultiProgress {
        &Self::init().multi_progress
    }
}
