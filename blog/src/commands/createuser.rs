//! The `createuser` management command.
//!
//! Inserts a user record into the configured store. The username and email
//! go through the same rules as the account form (length, email syntax,
//! uniqueness) before the insert.

use std::sync::Arc;

use async_trait::async_trait;
use blog_auth::{AccountContext, SqliteUserStore, UpdateAccountForm, UserRecord};
use blog_core::{BlogError, BlogResult, Settings, ValidationError};
use blog_forms::{full_clean, Form, FormData, ValidationOutcome};

use crate::command::ManagementCommand;
use crate::commands::open_store;

/// Creates a user account.
pub struct CreateUserCommand;

#[async_trait]
impl ManagementCommand for CreateUserCommand {
    fn name(&self) -> &'static str {
        "createuser"
    }

    fn help(&self) -> &'static str {
        "Create a user record"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("username")
                .long("username")
                .required(true)
                .help("Username for the new user"),
        )
        .arg(
            clap::Arg::new("email")
                .long("email")
                .required(true)
                .help("Email address for the new user"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> BlogResult<()> {
        let username = matches.get_one::<String>("username").map_or("", String::as_str);
        let email = matches.get_one::<String>("email").map_or("", String::as_str);

        let store = open_store(settings)?;
        let user = create_user(&store, username, email).await?;
        println!("Created user {} (id {})", user.username, user.id);
        Ok(())
    }
}

/// Validates `username` and `email`, then inserts them.
///
/// # Errors
///
/// Returns [`BlogError::ValidationError`] listing the rejected fields, or
/// the store's error if the insert fails.
pub async fn create_user(
    store: &Arc<SqliteUserStore>,
    username: &str,
    email: &str,
) -> BlogResult<UserRecord> {
    let mut form = UpdateAccountForm::new();
    form.bind(&FormData::from_pairs([("username", username), ("email", email)]));
    let ctx = AccountContext::new(store.clone());

    match full_clean(&mut form, &ctx).await? {
        ValidationOutcome::Accepted { .. } => {}
        ValidationOutcome::Rejected { errors } => {
            let mut problems: Vec<String> = errors
                .into_iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
                .collect();
            problems.sort();
            return Err(ValidationError::new(problems.join("; "), "invalid_user").into());
        }
    }

    let Some(changes) = form.changes() else {
        return Err(BlogError::BadRequest("user details were not accepted".to_string()));
    };
    store.create_user(&changes.username, &changes.email).await
}
