//! Management command framework.
//!
//! [`ManagementCommand`] defines one `blog` subcommand; [`CommandRegistry`]
//! collects them, builds the `clap` command tree, and dispatches.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use blog::command::ManagementCommand;
//! use blog_core::{BlogResult, Settings};
//!
//! struct GreetCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for GreetCommand {
//!     fn name(&self) -> &'static str { "greet" }
//!     fn help(&self) -> &'static str { "Say hello" }
//!
//!     async fn handle(&self, _matches: &clap::ArgMatches, _settings: &Settings) -> BlogResult<()> {
//!         println!("Hello from the blog!");
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use blog_core::{BlogError, BlogResult, Settings};

/// A subcommand of the `blog` CLI.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Returns the name used to invoke this command.
    fn name(&self) -> &'static str;

    /// Returns a short help description.
    fn help(&self) -> &'static str;

    /// Adds command-specific arguments. The default adds none.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the command.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> BlogResult<()>;
}

/// A registry of management commands.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a command, replacing any command with the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    /// Returns the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns the registered command names, sorted.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level `clap` command, including the global `--settings` option.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("blog")
            .about("Blog form validation and account management")
            .subcommand_required(true)
            .arg(
                clap::Arg::new("settings")
                    .long("settings")
                    .global(true)
                    .value_name("PATH")
                    .help("TOML or JSON settings file; BLOG_* variables still apply"),
            );

        for name in self.list_commands() {
            if let Some(cmd) = self.get(name) {
                let subcmd = clap::Command::new(cmd.name()).about(cmd.help());
                app = app.subcommand(cmd.add_arguments(subcmd));
            }
        }

        app
    }

    /// Dispatches to the subcommand selected in `matches`.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> BlogResult<()> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| BlogError::ConfigurationError("No subcommand specified".to_string()))?;

        let cmd = self
            .get(name)
            .ok_or_else(|| BlogError::ConfigurationError(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "running management command");
        cmd.handle(sub_matches, settings).await
    }
}
