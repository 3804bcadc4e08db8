//! ETL command handler.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use hbscope_core::EtlRunResponse;

use crate::cli::{EtlArgs, EtlCommand};
use crate::error::CliError;
use crate::output::{self, Printer, detail_block, yes_no};

use super::Ctx;

pub async fn handle(ctx: &Ctx<'_>, args: EtlArgs) -> Result<(), CliError> {
    match args.command {
        EtlCommand::Run => run(ctx).await,
    }
}

async fn run(ctx: &Ctx<'_>) -> Result<(), CliError> {
    if !ctx.backend.session().is_authenticated() {
        return Err(CliError::NotAuthenticated {
            action: "run the ETL".into(),
        });
    }

    let spinner = spinner(ctx.printer);
    let result = ctx.backend.bundles().run_etl().await;
    spinner.finish_and_clear();

    let response = result.map_err(|f| ctx.fail(f))?;

    let color = ctx.printer.color;
    let out = output::render_single(
        ctx.printer.format,
        &response,
        |r| etl_detail(r, color),
        |r| r.bundles_processed.to_string(),
    )?;
    output::print_output(&out, ctx.printer.quiet);

    let state = ctx.backend.bundles().state();
    match state.error {
        Some(failure) => ctx
            .printer
            .note(&format!("ETL finished but the refresh failed: {failure}")),
        None => ctx
            .printer
            .note(&format!("{} bundle(s) now stored", state.bundles.len())),
    }
    Ok(())
}

fn spinner(printer: Printer) -> ProgressBar {
    if printer.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({elapsed})")
    {
        spinner.set_style(style);
    }
    spinner.set_message("Running ETL");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn etl_detail(response: &EtlRunResponse, color: bool) -> String {
    let count = |v: Option<u64>| v.map_or_else(|| "-".into(), |n| n.to_string());
    detail_block(
        &[
            ("Bundles processed", response.bundles_processed.to_string()),
            ("Cleanup ran", yes_no(response.cleanup_ran, color)),
            ("Images downloaded", count(response.images_downloaded)),
            ("Bundle images", count(response.bundle_images_downloaded)),
            ("Book images", count(response.book_images_downloaded)),
        ],
        color,
    )
}
