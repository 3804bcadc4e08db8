//! Bundle command handlers.

use tabled::Tabled;

use hbscope_core::{Bundle, BundleLookup};

use crate::cli::{BundlesArgs, BundlesCommand};
use crate::error::CliError;
use crate::output::{self, detail_block, yes_no};

use super::{Ctx, util};

#[derive(Tabled)]
struct BundleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Ends")]
    ends: String,
    #[tabled(rename = "Verified")]
    verified: String,
}

fn to_row(bundle: &Bundle, color: bool) -> BundleRow {
    BundleRow {
        id: bundle.id.clone(),
        name: util::truncate(bundle.display_name(), 48),
        category: bundle.category.clone().unwrap_or_else(|| "-".into()),
        active: yes_no(bundle.is_active(), color),
        ends: bundle
            .end_date_datetime
            .as_deref()
            .and_then(hbscope_core::parse_timestamp)
            .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d").to_string()),
        verified: util::fmt_time(bundle.verified_at()),
    }
}

pub async fn handle(ctx: &Ctx<'_>, args: BundlesArgs) -> Result<(), CliError> {
    let bundles = ctx.backend.bundles();
    let printer = ctx.printer;

    match args.command {
        BundlesCommand::List { active } => {
            bundles.fetch_data().await.map_err(|f| ctx.fail(f))?;
            let state = bundles.state();
            let list: Vec<Bundle> = if active {
                state.active_bundles().into_iter().cloned().collect()
            } else {
                state.bundles.clone()
            };

            let out = output::render_list(
                printer.format,
                &list,
                |b| to_row(b, printer.color),
                |b| b.id.clone(),
            )?;
            output::print_output(&out, printer.quiet);
            if printer.is_table() {
                printer.note(&format!(
                    "{} bundle(s), last update {}",
                    list.len(),
                    util::fmt_time(state.last_update)
                ));
            }
            Ok(())
        }

        BundlesCommand::Featured => {
            bundles.fetch_data().await.map_err(|f| ctx.fail(f))?;
            let featured = bundles.state().featured.ok_or_else(|| CliError::NotFound {
                resource_type: "featured bundle".into(),
                identifier: "current".into(),
                list_command: "bundles list".into(),
            })?;
            show(ctx, &featured)
        }

        BundlesCommand::Get { id } => {
            let bundle = bundles
                .lookup(&BundleLookup::Id(id.clone()))
                .await
                .map_err(|f| CliError::lookup_failure(f, &ctx.url(), "bundle", &id, "bundles list"))?;
            show(ctx, &bundle)
        }

        BundlesCommand::ByName { machine_name } => {
            let bundle = bundles
                .lookup(&BundleLookup::MachineName(machine_name.clone()))
                .await
                .map_err(|f| {
                    CliError::lookup_failure(f, &ctx.url(), "bundle", &machine_name, "bundles list")
                })?;
            show(ctx, &bundle)
        }
    }
}

fn show(ctx: &Ctx<'_>, bundle: &Bundle) -> Result<(), CliError> {
    let color = ctx.printer.color;
    let out = output::render_single(
        ctx.printer.format,
        bundle,
        |b| bundle_detail(b, color),
        |b| b.id.clone(),
    )?;
    output::print_output(&out, ctx.printer.quiet);
    Ok(())
}

fn bundle_detail(bundle: &Bundle, color: bool) -> String {
    let opt = |v: Option<&str>| v.unwrap_or("-").to_owned();
    let tiers = bundle.price_tiers.as_deref().unwrap_or_default();
    let books = bundle.book_list.as_deref().unwrap_or_default();

    let mut text = detail_block(
        &[
            ("ID", bundle.id.clone()),
            ("Name", bundle.display_name().to_owned()),
            ("Machine name", bundle.machine_name.clone()),
            ("Category", opt(bundle.category.as_deref())),
            ("Active", yes_no(bundle.is_active(), color)),
            ("Starts", opt(bundle.start_date_datetime.as_deref())),
            ("Ends", opt(bundle.end_date_datetime.as_deref())),
            ("URL", opt(bundle.product_url.as_deref())),
            (
                "MSRP total",
                bundle
                    .msrp_total
                    .map_or_else(|| "-".into(), |v| format!("{v:.2}")),
            ),
            ("Verified", util::fmt_time(bundle.verified_at())),
            ("Tiers", tiers.len().to_string()),
            ("Items", books.len().to_string()),
        ],
        color,
    );

    for tier in tiers {
        let price = tier
            .price
            .as_ref()
            .map_or_else(|| "-".into(), |p| format!("{:.2} {}", p.amount, p.currency));
        let header = tier.header.as_deref().unwrap_or(&tier.identifier);
        text.push_str(&format!("\n  - {header}: {price}"));
    }
    text
}
