use casement_core::LogConfig;
use env_logger::{Builder, Env, Target};

/// Install the process logger.
///
/// `RUST_LOG` wins over `cfg.filter`. Output goes to stderr so it never
/// interleaves with console prompts on stdout. Returns `false` when a logger
/// was already installed; that is not an error.
pub fn init(cfg: &LogConfig) -> bool {
    let env = Env::default().default_filter_or(cfg.filter.as_str());

    let installed = Builder::from_env(env)
        .target(Target::Stderr)
        .format_timestamp_millis()
        .is_test(false)
        .try_init()
        .is_ok();

    if installed {
        log::debug!(target: "casement", "logging.init filter='{}'", cfg.filter);
    }
    installed
}
