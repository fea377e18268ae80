//! Output formatting for the CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use store_commerce::catalog::ProductSummary;
use store_commerce::search::Facet;
use store_commerce::Phase;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print one product row.
    pub fn product(&self, index: usize, product: &ProductSummary, language: &str) {
        if self.json {
            return;
        }
        let price = if product.price.is_discounted() {
            format!(
                "{} {} {}",
                style(product.price.base.to_string()).dim().strikethrough(),
                style(product.price.effective.to_string()).green(),
                style(format!("-{}%", product.price.discount_percentage)).yellow()
            )
        } else {
            product.price.effective.to_string()
        };
        println!(
            "  {} {}  {}  {}",
            style(format!("{:>3}.", index)).dim(),
            product.display_name(language),
            price,
            style(format!("#{}", product.id)).dim()
        );
    }

    /// Print facet counts, marking selected values.
    pub fn facet(&self, facet: &Facet) {
        if self.json {
            return;
        }
        let values: Vec<String> = facet
            .values
            .iter()
            .map(|v| {
                let text = format!("{} ({})", v.value, v.count);
                if v.selected {
                    style(text).bold().to_string()
                } else {
                    text
                }
            })
            .collect();
        self.kv(&facet.name, &values.join(", "));
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Colored phase label.
pub fn phase_badge(phase: Phase) -> String {
    let label = phase.as_str();
    match phase {
        Phase::Exhausted => style(label).green().to_string(),
        Phase::LoadingFirstPage | Phase::LoadingMore => style(label).yellow().to_string(),
        Phase::Idle => style(label).dim().to_string(),
        Phase::Loaded => label.to_string(),
    }
}
