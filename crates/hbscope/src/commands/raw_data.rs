//! Raw data command handlers.

use bytesize::ByteSize;
use tabled::Tabled;

use hbscope_core::RawDataRecord;
use hbscope_core::raw_data::{export, payload_size};

use crate::cli::{RawDataArgs, RawDataCommand};
use crate::error::CliError;
use crate::output::{self, detail_block};

use super::{Ctx, util};

#[derive(Tabled)]
struct RawDataRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Scraped")]
    scraped: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Version")]
    version: String,
}

fn to_row(r: &RawDataRecord) -> RawDataRow {
    RawDataRow {
        id: r.id.clone(),
        scraped: util::fmt_time(r.scraped_at()),
        source: util::truncate(&r.source_url, 48),
        size: human_size(r),
        version: r.json_version.clone().unwrap_or_else(|| "-".into()),
    }
}

fn human_size(record: &RawDataRecord) -> String {
    ByteSize::b(u64::try_from(payload_size(record)).unwrap_or(u64::MAX)).to_string()
}

pub async fn handle(ctx: &Ctx<'_>, args: RawDataArgs) -> Result<(), CliError> {
    let raw = ctx.backend.raw_data();
    let printer = ctx.printer;

    match args.command {
        RawDataCommand::List => {
            let records = raw.fetch_list().await.map_err(|f| ctx.fail(f))?;
            let out = output::render_list(printer.format, &records, to_row, |r| r.id.clone())?;
            output::print_output(&out, printer.quiet);
            Ok(())
        }

        RawDataCommand::Latest => {
            let record = raw.fetch_latest().await.map_err(|f| {
                CliError::lookup_failure(f, &ctx.url(), "raw data", "latest", "raw-data list")
            })?;
            show(ctx, &record)
        }

        RawDataCommand::Get { id } => {
            let record = raw.fetch_by_id(&id).await.map_err(|f| {
                CliError::lookup_failure(f, &ctx.url(), "raw data", &id, "raw-data list")
            })?;
            show(ctx, &record)
        }

        RawDataCommand::Export { id, file } => {
            let record = raw.fetch_by_id(&id).await.map_err(|f| {
                CliError::lookup_failure(f, &ctx.url(), "raw data", &id, "raw-data list")
            })?;
            let written = export(&record, &file).map_err(|e| CliError::from_core(e, &ctx.url()))?;
            printer.note(&format!(
                "Wrote {} to {}",
                ByteSize::b(u64::try_from(written).unwrap_or(u64::MAX)),
                file.display()
            ));
            Ok(())
        }
    }
}

fn show(ctx: &Ctx<'_>, record: &RawDataRecord) -> Result<(), CliError> {
    let color = ctx.printer.color;
    let out = output::render_single(
        ctx.printer.format,
        record,
        |r| {
            detail_block(
                &[
                    ("ID", r.id.clone()),
                    ("Scraped", util::fmt_time(r.scraped_at())),
                    ("Source", r.source_url.clone()),
                    ("Size", human_size(r)),
                    ("Hash", r.json_hash.clone().unwrap_or_else(|| "-".into())),
                    ("Version", r.json_version.clone().unwrap_or_else(|| "-".into())),
                ],
                color,
            )
        },
        |r| r.id.clone(),
    )?;
    output::print_output(&out, ctx.printer.quiet);
    Ok(())
}
