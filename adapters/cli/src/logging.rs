use env_logger::{Builder, Env};
use log::LevelFilter;

/// Crates whose records follow the `--verbose` switch.
const SESSION_TARGETS: [&str; 3] = ["path_defence", "path_defence_engine", "path_defence_world"];

/// Installs the global logger for a session run.
///
/// `RUST_LOG` replaces the filter entirely. Otherwise the session crates log at
/// debug level when `verbose` is set and at info level when it is not, while
/// everything else is limited to warnings.
pub(crate) fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    let _ = builder.format_timestamp(None);

    // Only fails when a logger is already installed.
    let _ = builder.try_init();
}

fn default_filter(verbose: bool) -> String {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut filter = LevelFilter::Warn.to_string();
    for target in SESSION_TARGETS {
        filter.push_str(&format!(",{target}={level}"));
    }
    filter
}
