//! CLI flag overrides on top of `hbscope-config`.
//!
//! Core never sees these types -- it receives a pre-built `BackendConfig`.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use hbscope_config::{Config, config_path, load_config_from};
use hbscope_core::{BackendConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Config file in effect: `--config` / `$HBSCOPE_CONFIG`, else the default.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file + environment for this invocation.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&active_config_path(global))?)
}

/// Build the `BackendConfig`, applying flag overrides to the file values.
pub fn backend_config(cfg: &Config, global: &GlobalOpts) -> Result<BackendConfig, CliError> {
    let mut backend = cfg.to_backend_config()?;

    if let Some(ref raw) = global.api_url {
        backend.url = raw.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    if global.insecure {
        backend.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        backend.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = global.long_timeout {
        backend.long_timeout = Duration::from_secs(secs);
    }
    Ok(backend)
}

/// `--output`, else `[defaults] output`, else table.
pub fn output_format(cfg: &Config, global: &GlobalOpts) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// `--color`, else `[defaults] color`, else auto.
pub fn color_mode(cfg: &Config, global: &GlobalOpts) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["hbscope"];
        argv.extend_from_slice(args);
        argv.push("health");
        Cli::try_parse_from(argv)
            .unwrap_or_else(|e| panic!("parse: {e}"))
            .global
    }

    #[test]
    fn flags_override_file_values() {
        let mut cfg = Config::default();
        cfg.api.timeout = 20;

        let opts = global(&["--api-url", "https://books.example.com", "--long-timeout", "900"]);
        let backend = backend_config(&cfg, &opts).unwrap_or_else(|e| panic!("config: {e}"));

        assert_eq!(backend.url.as_str(), "https://books.example.com/");
        assert_eq!(backend.timeout, Duration::from_secs(20));
        assert_eq!(backend.long_timeout, Duration::from_secs(900));
    }

    #[test]
    fn bad_api_url_is_a_usage_error() {
        let opts = global(&["--api-url", "::nope"]);
        let err = backend_config(&Config::default(), &opts).err();
        assert!(matches!(err, Some(CliError::Validation { .. })));
    }

    #[test]
    fn output_falls_back_to_config() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&cfg, &global(&[])), OutputFormat::Yaml);
        assert_eq!(output_format(&cfg, &global(&["-o", "json"])), OutputFormat::Json);

        cfg.defaults.output = "nonsense".into();
        assert_eq!(output_format(&cfg, &global(&[])), OutputFormat::Table);
    }
}
