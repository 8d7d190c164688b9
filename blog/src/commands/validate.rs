//! The `validate` management command.
//!
//! Runs one submission through one of the forms and prints the outcome as
//! JSON. Password values are masked in the output.
//!
//! ```text
//! blog validate register --data 'username=bob&email=bob%40x.com&password=p1&confirm_password=p1'
//! blog validate account --as-user alice --data 'username=alice&email=alice%40x.com' --file picture=me.png
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use blog_auth::{AccountContext, InMemoryUserStore, SessionUser, UserField, UserLookup};
use blog_core::{BlogError, BlogResult, Settings};
use blog_forms::{FormData, UploadedFile, ValidationOutcome};

use crate::command::ManagementCommand;
use crate::commands::open_store;
use crate::submission::{validate_for_display, FormKind};

/// Validates a submission against a named form.
pub struct ValidateCommand;

#[async_trait]
impl ManagementCommand for ValidateCommand {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn help(&self) -> &'static str {
        "Validate a form submission and print the outcome as JSON"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("form")
                .required(true)
                .value_parser(clap::builder::PossibleValuesParser::new(
                    FormKind::ALL.map(FormKind::as_str),
                ))
                .help("Which form to validate"),
        )
        .arg(
            clap::Arg::new("data")
                .long("data")
                .default_value("")
                .help("URL-encoded form body"),
        )
        .arg(
            clap::Arg::new("file")
                .long("file")
                .value_name("FIELD=PATH")
                .action(clap::ArgAction::Append)
                .help("Attach a file upload to a field"),
        )
        .arg(
            clap::Arg::new("as-user")
                .long("as-user")
                .value_name("USERNAME")
                .help("Validate as this logged-in user (account form)"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> BlogResult<()> {
        let kind: FormKind = matches
            .get_one::<String>("form")
            .map_or("", String::as_str)
            .parse()?;
        let body = matches.get_one::<String>("data").map_or("", String::as_str);
        let files: Vec<&str> = matches
            .get_many::<String>("file")
            .map(|values| values.map(String::as_str).collect())
            .unwrap_or_default();
        let as_user = matches.get_one::<String>("as-user").map(String::as_str);

        let users: Arc<dyn UserLookup> = if kind.needs_store() || as_user.is_some() {
            open_store(settings)?
        } else {
            Arc::new(InMemoryUserStore::new())
        };

        let outcome = run_validate(kind, body, &files, as_user, users).await?;
        let json = serde_json::to_string_pretty(&outcome).map_err(std::io::Error::from)?;
        println!("{json}");
        Ok(())
    }
}

/// Builds the submission, resolves the session user, and validates.
///
/// # Errors
///
/// Returns [`BlogError::BadRequest`] for a malformed `--file` argument,
/// [`BlogError::NotFound`] if `as_user` names no user, an IO error if an
/// attached file cannot be read, and any storage failure.
pub async fn run_validate(
    kind: FormKind,
    body: &str,
    files: &[&str],
    as_user: Option<&str>,
    users: Arc<dyn UserLookup>,
) -> BlogResult<ValidationOutcome> {
    let mut data = FormData::parse(body);
    for arg in files {
        let (field, path) = parse_file_arg(arg)?;
        data = data.with_file(field, read_upload(&path).await?);
    }

    let mut ctx = AccountContext::new(users);
    if let Some(username) = as_user {
        let record = ctx
            .users
            .find_by(UserField::Username, username)
            .await?
            .ok_or_else(|| BlogError::NotFound(format!("no user named {username}")))?;
        ctx = ctx.with_user(SessionUser::from(record));
    }

    tracing::info!(form = %kind, "validating submission");
    validate_for_display(kind, &data, &ctx).await
}

/// Splits a `FIELD=PATH` argument.
fn parse_file_arg(arg: &str) -> BlogResult<(String, PathBuf)> {
    match arg.split_once('=') {
        Some((field, path)) if !field.is_empty() && !path.is_empty() => {
            Ok((field.to_string(), PathBuf::from(path)))
        }
        _ => Err(BlogError::BadRequest(format!(
            "expected FIELD=PATH for --file, got '{arg}'"
        ))),
    }
}

async fn read_upload(path: &Path) -> BlogResult<UploadedFile> {
    let content = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedFile::new(name, content_type_for(path), content))
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
