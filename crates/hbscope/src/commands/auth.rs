//! Login, logout and whoami.

use dialoguer::Input;

use hbscope_core::{LoginCredentials, UserInfo};

use crate::cli::LoginArgs;
use crate::error::CliError;
use crate::output::{self, detail_block};

use super::{Ctx, util};

pub async fn login(ctx: &Ctx<'_>, args: LoginArgs) -> Result<(), CliError> {
    let username = match args.username.or_else(|| ctx.config.username.clone()) {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(util::prompt_err)?,
    };

    let password = if args.password_stdin {
        util::read_stdin_line()?
    } else {
        rpassword::prompt_password("Password: ").map_err(util::prompt_err)?
    };

    if username.is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let user = ctx
        .backend
        .session()
        .login(&LoginCredentials::new(username, password))
        .await
        .map_err(|e| CliError::from_core(e, &ctx.url()))?;

    ctx.printer
        .note(&format!("Logged in as {} <{}>", user.username, user.email));
    Ok(())
}

pub fn logout(ctx: &Ctx<'_>) {
    let was_authenticated = ctx.backend.session().is_authenticated();
    ctx.backend.session().logout();
    if was_authenticated {
        ctx.printer.note("Logged out");
    } else {
        ctx.printer.note("No active session");
    }
}

pub fn whoami(ctx: &Ctx<'_>) -> Result<(), CliError> {
    let user = ctx
        .backend
        .session()
        .current_user()
        .ok_or_else(|| CliError::NotAuthenticated {
            action: "show the current user".into(),
        })?;

    let color = ctx.printer.color;
    let out = output::render_single(
        ctx.printer.format,
        &user,
        |u| user_detail(u, color),
        |u| u.username.clone(),
    )?;
    output::print_output(&out, ctx.printer.quiet);
    Ok(())
}

fn user_detail(user: &UserInfo, color: bool) -> String {
    detail_block(
        &[
            ("Username", user.username.clone()),
            ("Email", user.email.clone()),
            ("ID", user.id.clone()),
            ("Created", user.created_at.clone()),
        ],
        color,
    )
}
