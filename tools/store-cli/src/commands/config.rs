//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use store_app::generate_default_config;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    let config = &ctx.config;

    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output.kv("timeout_ms", &config.api.timeout_ms.to_string());
    if config.api.bearer_token.is_some() {
        ctx.output.kv("bearer_token", "(set)");
    }

    ctx.output.info("[search]");
    ctx.output.kv("page_size", &config.search.page_size.to_string());
    ctx.output
        .kv("default_sort", config.search.default_sort.as_str());

    ctx.output.info("[i18n]");
    ctx.output
        .kv("default_language", config.i18n.default_language.code());
    ctx.output
        .kv("reload_delay_ms", &config.i18n.reload_delay_ms.to_string());
    ctx.output.kv(
        "reload_on_same_direction",
        &config.i18n.reload_on_same_direction.to_string(),
    );
    if let Some(path) = &config.i18n.translations {
        ctx.output.kv("translations", &path.display().to_string());
    }

    ctx.output.info("[storage]");
    ctx.output
        .kv("data_dir", &config.storage.data_dir.display().to_string());

    ctx.output.info("[logging]");
    ctx.output.kv("level", &config.logging.level.to_string());
    ctx.output.kv("format", &config.logging.format.to_string());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("storefront.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let report = ctx.config.validate();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": report.is_valid(),
            "errors": report.errors,
            "warnings": report.warnings,
        }));
    } else {
        for error in &report.errors {
            ctx.output.error(&format!("Error: {}", error));
        }
        for warning in &report.warnings {
            ctx.output.warn(&format!("Warning: {}", warning));
        }
    }

    if !report.is_valid() {
        bail!("Configuration has {} error(s)", report.errors.len());
    }

    if report.warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }

    Ok(())
}
