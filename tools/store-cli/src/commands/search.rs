//! Product search command.

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use store_commerce::search::{
    Facet, ParamValue, RouteParams, SearchConfig, SearchScope, SortKey,
};
use store_commerce::{BrandId, CategoryId, MergeOutcome, Phase, ResultsSnapshot};

use super::{ScopeArg, SearchArgs};
use crate::context::Context;
use crate::output::phase_badge;

#[derive(Serialize)]
struct SearchReport<'a> {
    scope: &'a SearchScope,
    pages_loaded: u32,
    facet_list: Vec<Facet>,
    #[serde(flatten)]
    snapshot: &'a ResultsSnapshot,
}

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let scope = resolve_scope(&args)?;
    let params = route_params(&args);
    if let Some(sort) = &args.sort {
        if SortKey::from_wire(sort).is_none() {
            ctx.output.warn(&format!(
                "Unknown sort '{}', using {}",
                sort,
                ctx.config.search.default_sort.as_str()
            ));
        }
    }

    let app = ctx.app()?;
    let language = app.current_language();
    let screen = app.search_controller(scope.clone())?;
    let controller = screen.controller();
    ctx.output.debug(&format!(
        "Searching {} as {} ({})",
        ctx.config.api.base_url,
        scope.display_name(),
        language
    ));

    let spinner = ctx.output.spinner("Loading page 1");
    screen.open(&params).await;
    spinner.finish_and_clear();

    let mut snapshot = controller.snapshot();
    if let Some(failure) = &snapshot.failure {
        bail!("Search failed: {}", failure.message);
    }

    let mut pages_loaded = 1;
    while pages_loaded < args.pages && snapshot.phase == Phase::Loaded {
        let next = pages_loaded + 1;
        let spinner = ctx.output.spinner(&format!("Loading page {}", next));
        let outcome = controller.load_more().await;
        spinner.finish_and_clear();
        snapshot = controller.snapshot();

        match outcome {
            Some(MergeOutcome::Appended { added, duplicates }) => {
                pages_loaded = next;
                if duplicates > 0 {
                    ctx.output.debug(&format!(
                        "Page {}: {} new, {} already listed",
                        next, added, duplicates
                    ));
                }
            }
            Some(MergeOutcome::Failed { page }) => {
                let message = snapshot
                    .failure
                    .as_ref()
                    .map(|f| f.message.clone())
                    .unwrap_or_default();
                ctx.output
                    .warn(&format!("Page {} failed: {}", page, message));
                break;
            }
            _ => break,
        }
    }
    controller.close().await;

    let selection = SearchConfig::from_route_params(&scope, &params).filters;
    let facets = snapshot.facets.to_facet_list(&selection);

    if ctx.output.is_json() {
        ctx.output.json(&SearchReport {
            scope: &scope,
            pages_loaded,
            facet_list: facets,
            snapshot: &snapshot,
        });
        return Ok(());
    }

    let translations = app.language().translations();
    let total = snapshot
        .pagination
        .as_ref()
        .map(|p| p.total)
        .unwrap_or(snapshot.items.len() as u64);
    ctx.output.header(&translations.format(
        language,
        "search.results",
        &[("count", &total.to_string())],
    ));

    if snapshot.items.is_empty() {
        ctx.output.info(translations.translate(language, "search.empty"));
        return Ok(());
    }

    for (i, product) in snapshot.items.iter().enumerate() {
        ctx.output.product(i + 1, product, language.code());
    }

    if !args.no_facets && !facets.is_empty() {
        ctx.output.header("Facets");
        for facet in &facets {
            ctx.output.facet(facet);
        }
    }

    println!();
    if let Some(pagination) = &snapshot.pagination {
        ctx.output.kv(
            "pages",
            &format!("{}/{}", pagination.current_page, pagination.total_pages),
        );
    }
    ctx.output.kv("phase", &phase_badge(snapshot.phase));
    if snapshot.end_of_list {
        ctx.output
            .success(translations.translate(language, "search.end_of_list"));
    }

    Ok(())
}

/// Screen scope from `--scope`, pinning the first matching filter value.
fn resolve_scope(args: &SearchArgs) -> Result<SearchScope> {
    let scope = match args.scope {
        ScopeArg::Search => SearchScope::Search,
        ScopeArg::Deals => SearchScope::Deals,
        ScopeArg::Category => {
            let id = args
                .category
                .first()
                .context("--scope category needs a --category")?;
            SearchScope::Category(CategoryId::new(id.clone()))
        }
        ScopeArg::Brand => {
            let brand = args
                .brand
                .first()
                .context("--scope brand needs a --brand")?;
            SearchScope::Brand(BrandId::new(brand.clone()))
        }
    };
    Ok(scope)
}

/// Route parameters as a listing screen would receive them.
fn route_params(args: &SearchArgs) -> RouteParams {
    let mut params = RouteParams::new();
    if let Some(query) = &args.query {
        params.insert("q".into(), query.as_str().into());
    }
    for (key, values) in [
        ("category", &args.category),
        ("brand", &args.brand),
        ("price", &args.price),
    ] {
        if !values.is_empty() {
            params.insert(key.into(), ParamValue::Many(values.clone()));
        }
    }
    if args.on_sale {
        params.insert("on_sale".into(), "1".into());
    }
    if let Some(status) = &args.status {
        params.insert("status".into(), status.as_str().into());
    }
    if let Some(sort) = &args.sort {
        params.insert("sort".into(), sort.as_str().into());
    }
    params
}
