//! The `blog` management CLI.
//!
//! ```bash
//! blog --settings blog.toml check
//! blog createuser --username alice --email alice@example.com
//! blog validate register --data 'username=bob&email=bob%40x.com&password=p1&confirm_password=p1'
//! ```

use std::process::ExitCode;

use blog::command::CommandRegistry;
use blog::commands::register_builtin_commands;
use blog_core::logging::setup_logging;
use blog_core::{settings_loader, BlogResult, Settings};

fn load_settings(matches: &clap::ArgMatches) -> BlogResult<Settings> {
    match matches.get_one::<String>("settings") {
        Some(path) => settings_loader::from_file_with_env(path),
        None => Ok(settings_loader::from_env()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings = match load_settings(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&settings);
    tracing::debug!(database = %settings.database.path.display(), "settings loaded");

    match registry.execute(&matches, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(status = e.status_code(), "{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
