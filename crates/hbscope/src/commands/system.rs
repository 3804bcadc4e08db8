//! Backend health check.

use hbscope_core::{CoreError, HealthStatus};

use crate::error::CliError;
use crate::output::{self, detail_block};

use super::Ctx;

pub async fn health(ctx: &Ctx<'_>) -> Result<(), CliError> {
    let status = ctx
        .backend
        .api()
        .health()
        .await
        .map_err(|e| CliError::from_core(CoreError::from(e), &ctx.url()))?;

    let url = ctx.url();
    let color = ctx.printer.color;
    let out = output::render_single(
        ctx.printer.format,
        &status,
        |s| health_detail(s, &url, color),
        |s| s.status.clone(),
    )?;
    output::print_output(&out, ctx.printer.quiet);
    Ok(())
}

fn health_detail(status: &HealthStatus, url: &str, color: bool) -> String {
    detail_block(
        &[
            ("Backend", url.to_owned()),
            ("Status", status.status.clone()),
            (
                "Database",
                status.database.clone().unwrap_or_else(|| "-".into()),
            ),
        ],
        color,
    )
}
