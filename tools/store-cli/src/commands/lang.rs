//! Language commands.

use anyhow::{Context as _, Result};
use dialoguer::Select;
use serde::Serialize;
use store_i18n::{Language, SwitchOutcome};

use super::{LangArgs, LangCommand};
use crate::context::Context;

#[derive(Serialize)]
struct LanguageInfo {
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    direction: &'static str,
    active: bool,
}

impl LanguageInfo {
    fn new(language: Language, active: Language) -> Self {
        Self {
            code: language.code(),
            name: language.english_name(),
            native_name: language.native_name(),
            direction: language.direction().as_str(),
            active: language == active,
        }
    }
}

/// Run the lang command.
pub async fn run(args: LangArgs, ctx: &Context) -> Result<()> {
    match args.command {
        Some(LangCommand::Show) | None => show_language(ctx),
        Some(LangCommand::List) => list_languages(ctx),
        Some(LangCommand::Switch { code }) => switch_language(code, ctx).await,
    }
}

fn show_language(ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let current = app.current_language();

    if ctx.output.is_json() {
        ctx.output.json(&LanguageInfo::new(current, current));
        return Ok(());
    }

    ctx.output.header("Language");
    ctx.output.kv("code", current.code());
    ctx.output.kv(
        "name",
        &format!("{} ({})", current.english_name(), current.native_name()),
    );
    ctx.output.kv("direction", current.direction().as_str());
    Ok(())
}

fn list_languages(ctx: &Context) -> Result<()> {
    let current = ctx.app()?.current_language();
    let languages: Vec<LanguageInfo> = Language::ALL
        .into_iter()
        .map(|l| LanguageInfo::new(l, current))
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&languages);
        return Ok(());
    }

    ctx.output.header("Supported languages");
    for info in &languages {
        let marker = if info.active { " (active)" } else { "" };
        ctx.output.list_item(&format!(
            "{}  {} / {}  {}{}",
            info.code, info.name, info.native_name, info.direction, marker
        ));
    }
    Ok(())
}

async fn switch_language(code: Option<String>, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let current = app.current_language();

    let target = match code {
        Some(code) => code.parse::<Language>()?,
        None => {
            let items: Vec<String> = Language::ALL
                .iter()
                .map(|l| format!("{} ({})", l.native_name(), l.code()))
                .collect();
            let default = Language::ALL
                .iter()
                .position(|l| *l == current)
                .unwrap_or(0);
            let selection = Select::new()
                .with_prompt("Select language")
                .items(&items)
                .default(default)
                .interact()
                .context("Language selection cancelled")?;
            Language::ALL[selection]
        }
    };

    let outcome = app
        .language()
        .switch(target)
        .await
        .with_context(|| format!("Failed to switch language to {}", target))?;

    if ctx.output.is_json() {
        let (changed, reloaded) = match outcome {
            SwitchOutcome::Unchanged => (false, false),
            SwitchOutcome::Switched { reloaded, .. } => (true, reloaded),
        };
        ctx.output.json(&serde_json::json!({
            "language": target.code(),
            "direction": target.direction().as_str(),
            "changed": changed,
            "reloaded": reloaded,
        }));
        return Ok(());
    }

    match outcome {
        SwitchOutcome::Unchanged => {
            ctx.output
                .info(&format!("Language is already {}", target.english_name()));
        }
        SwitchOutcome::Switched { .. } => {
            ctx.output.success(&app.language().translations().format(
                target,
                "lang.changed",
                &[("language", target.native_name())],
            ));
        }
    }
    Ok(())
}
