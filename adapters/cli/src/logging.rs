//! Logger installation for the command-line runner.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger, honouring `RUST_LOG` when it is set.
///
/// `verbose` lowers the default filter from info to debug.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).format_timestamp(None).try_init();
}
