mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hbscope_core::Backend;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Printer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "hbscope", &mut std::io::stdout());
            Ok(())
        }

        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        cmd => {
            let cfg = config::load(&cli.global)?;
            let printer = Printer::new(
                config::output_format(&cfg, &cli.global),
                config::color_mode(&cfg, &cli.global),
                cli.global.quiet,
            );
            let backend_config = config::backend_config(&cfg, &cli.global)?;
            let url = backend_config.url.to_string();
            let backend = Backend::new(backend_config, cfg.session_store())
                .map_err(|e| CliError::from_core(e, &url))?;
            backend.restore_session();

            tracing::debug!(command = ?cmd, "dispatching command");
            let ctx = commands::Ctx {
                backend: &backend,
                config: &cfg,
                printer,
            };
            commands::dispatch(cmd, &ctx).await
        }
    }
}
