//! Command dispatch: bridges CLI args -> core managers -> output formatting.

pub mod auth;
pub mod bundles;
pub mod config_cmd;
pub mod etl;
pub mod raw_data;
pub mod system;
pub mod util;

use hbscope_config::Config;
use hbscope_core::{Backend, Failure};

use crate::cli::Command;
use crate::error::CliError;
use crate::output::Printer;

/// Per-invocation handles shared by every backend-bound handler.
pub struct Ctx<'a> {
    pub backend: &'a Backend,
    pub config: &'a Config,
    pub printer: Printer,
}

impl Ctx<'_> {
    pub fn url(&self) -> String {
        self.backend.config().url.to_string()
    }

    /// Map a manager failure, tagging connection errors with the backend URL.
    pub fn fail(&self, failure: Failure) -> CliError {
        CliError::from_failure(failure, &self.url())
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Logout => {
            auth::logout(ctx);
            Ok(())
        }
        Command::Whoami => auth::whoami(ctx),
        Command::Bundles(args) => bundles::handle(ctx, args).await,
        Command::Etl(args) => etl::handle(ctx, args).await,
        Command::RawData(args) => raw_data::handle(ctx, args).await,
        Command::Health => system::health(ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a backend".into(),
        }),
    }
}
