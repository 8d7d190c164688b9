//! Built-in management commands.
//!
//! Each command implements [`ManagementCommand`](crate::command::ManagementCommand).

pub mod check;
pub mod createuser;
pub mod validate;

use std::sync::Arc;

use blog_auth::SqliteUserStore;
use blog_core::{BlogResult, Settings};

pub use check::CheckCommand;
pub use createuser::CreateUserCommand;
pub use validate::ValidateCommand;

use crate::command::CommandRegistry;

/// Registers all built-in commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(ValidateCommand));
    registry.register(Box::new(CreateUserCommand));
    registry.register(Box::new(CheckCommand));
}

/// Opens the user store configured in `settings`.
pub(crate) fn open_store(settings: &Settings) -> BlogResult<Arc<SqliteUserStore>> {
    SqliteUserStore::open(settings.database.path.clone()).map(Arc::new)
}
