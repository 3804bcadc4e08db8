//! Config subcommand handlers.

use dialoguer::{Input, Select};

use hbscope_config::{Config, ConfigError, StoreKind, save_config_to};
use hbscope_core::DEFAULT_BASE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, print_output};

use super::util::{self, prompt_err};

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", config::active_config_path(global).display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let format = config::output_format(&cfg, global);
            let rendered = toml::to_string_pretty(&cfg).map_err(ConfigError::from)?;
            let out = output::render_single(
                format,
                &cfg,
                |_| rendered.clone(),
                |c| c.api.base_url.clone(),
            )?;
            print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(global),
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_config_path(global);
    eprintln!("hbscope configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    if path.exists()
        && !util::confirm(
            &format!("{} exists. Overwrite?", path.display()),
            global.yes,
        )?
    {
        return Ok(());
    }

    let mut cfg = Config::default();

    cfg.api.base_url = Input::<String>::new()
        .with_prompt("Backend URL")
        .default(DEFAULT_BASE_URL.to_owned())
        .validate_with(|raw: &String| {
            raw.parse::<url::Url>()
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Default username (empty for none)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    cfg.username = Some(username).filter(|u| !u.is_empty());

    let store_choices = &[
        "Session file in the data directory (default)",
        "System keyring",
        "Memory only (log in on every run)",
    ];
    let selection = Select::new()
        .with_prompt("Where to keep the login session?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    cfg.session.store = match selection {
        1 => StoreKind::Keyring,
        2 => StoreKind::Memory,
        _ => StoreKind::File,
    };

    save_config_to(&cfg, &path)?;
    eprintln!("   Config written to {}", path.display());
    Ok(())
}
