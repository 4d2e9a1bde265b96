use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use parking_lot::Mutex;

use argtable::args::{exit_code, DispatchError, Dispatcher};
use argtable::config::Config;
use argtable::handlers::{builtin_registry, SharedSession};
use argtable::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(
    name = "argtable",
    version,
    about = "Validate and dispatch -tag / -tag=value arguments",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Path to the config file (default: platform config dir).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Arguments to dispatch, e.g. -arg1 -arg2=hello.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    tokens: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);

    let session = SharedSession::default();
    let stdout = Arc::new(Mutex::new(std::io::stdout()));
    let registry = match builtin_registry(session, stdout) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let dispatcher = Dispatcher::new(&registry).with_max_tokens(config.dispatch.token_limit());
    let outcome = dispatcher.dispatch(&cli.tokens);

    if let Err(e) = &outcome {
        eprintln!("Error: {}", e);
        if matches!(e, DispatchError::UnknownArgument { .. })
            && config.dispatch.list_accepted_on_unknown
        {
            eprint!("{}", registry.usage());
        }
    }

    std::process::exit(exit_code(&outcome));
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Config::load().context("loading default config"),
    }
}
