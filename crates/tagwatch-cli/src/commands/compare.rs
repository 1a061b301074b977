use crate::settings::{self, Settings};
use crate::support::{
    display_values, read_json_or_exit, render_json_or_exit, write_json_or_exit,
};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tagwatch_compare::{Comparator, Comparison, MissingPagePolicy};
use tagwatch_schema::{Definition, parse_definition};
use tracing::info;

const CHECK_KIND: &str = "tagwatch.compare.v1";

pub struct Args {
    pub baseline: String,
    pub observed: String,
    pub settings: Option<String>,
    pub env: Option<String>,
    pub focus: Option<String>,
    pub continue_on_missing_page: bool,
    pub validate_observed: bool,
    pub out: Option<String>,
    pub json: bool,
}

fn load_settings_or_exit(settings_path: Option<&str>, env: Option<&str>) -> Settings {
    let (Some(path), Some(env)) = (settings_path, env) else {
        return Settings::default();
    };
    settings::load(Path::new(path), env).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    })
}

fn load_definition_or_exit(path: &Path, focus: Option<&str>) -> Definition {
    let raw = read_json_or_exit(path, "baseline");
    let definition = parse_definition(&raw).unwrap_or_else(|err| {
        eprintln!("error: invalid baseline {}: {err}", path.display());
        std::process::exit(2);
    });
    let Some(page) = focus else {
        return definition;
    };
    definition.focus(page).unwrap_or_else(|| {
        eprintln!("error: focus page `{page}` is not defined in the baseline");
        std::process::exit(2);
    })
}

/// Keep only the focused page so the result document stays small.
fn focus_observed(observed: Value, focus: Option<&str>) -> Value {
    match (focus, observed) {
        (Some(page), Value::Object(mut pages)) => {
            let mut focused = Map::new();
            if let Some(entry) = pages.remove(page) {
                focused.insert(page.to_string(), entry);
            }
            Value::Object(focused)
        }
        (_, observed) => observed,
    }
}

fn result_label(comparison: &Comparison) -> &'static str {
    if comparison.summary.is_clean() {
        "accepted"
    } else {
        "rejected"
    }
}

fn print_human_summary(comparison: &Comparison, baseline: &Path, digest: &str, observed: &Path) {
    println!("tagwatch compare");
    println!("  Baseline: {} ({digest})", baseline.display());
    println!("  Observed: {}", observed.display());
    println!("  Result: {}", result_label(comparison));
    println!("  Succeeded: {}", comparison.summary.succeeded);
    println!("  Failed: {}", comparison.summary.failed);
    if comparison.summary.is_clean() {
        return;
    }
    println!("  Failures:");
    for (page, variable) in comparison.failures() {
        println!(
            "    - {page} / {} ({}): {}",
            variable.variable_id,
            variable.variable_mapping,
            variable.message()
        );
        if let Some(expected) = &variable.expected {
            println!("        expected: {}", display_values(expected));
        }
        if let Some(actual) = &variable.actual {
            println!("        actual:   {}", display_values(actual));
        }
    }
}

pub fn run(args: Args) {
    let baseline_path = PathBuf::from(&args.baseline);
    let observed_path = PathBuf::from(&args.observed);
    let focus = args.focus.as_deref();

    let settings = load_settings_or_exit(args.settings.as_deref(), args.env.as_deref());
    let mut options = settings.compare_options();
    if args.continue_on_missing_page {
        options.missing_page_policy = MissingPagePolicy::MarkAndContinue;
    }
    if args.validate_observed {
        options.validate_observed = true;
    }

    let definition = load_definition_or_exit(&baseline_path, focus);
    let digest = definition.digest();
    let observed = focus_observed(read_json_or_exit(&observed_path, "observed"), focus);

    let comparator = Comparator::with_options(definition, options);
    info!(
        baseline = %baseline_path.display(),
        pages = comparator.definition().page_count(),
        variables = comparator.definition().variable_count(),
        policy = ?comparator.options().missing_page_policy,
        validate_observed = comparator.options().validate_observed,
        "comparing snapshot against baseline"
    );
    let comparison = comparator
        .compare(&observed, &settings.mapping)
        .unwrap_or_else(|err| {
            eprintln!("error: {err}");
            std::process::exit(2);
        });

    if let Some(out) = &args.out {
        if focus.is_some() {
            eprintln!("note: --focus is set; not writing {out}");
        } else {
            write_json_or_exit(Path::new(out), &comparison.document, "result document");
        }
    }

    if args.json {
        let payload = json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "generatedAt": chrono::Utc::now().to_rfc3339(),
            "baseline": baseline_path.display().to_string(),
            "observed": observed_path.display().to_string(),
            "definitionDigest": digest,
            "result": result_label(&comparison),
            "summary": comparison.summary,
            "failures": comparison
                .failures()
                .map(|(page, variable)| json!({"page": page, "outcome": variable}))
                .collect::<Vec<_>>(),
            "document": comparison.document,
        });
        println!("{}", render_json_or_exit(&payload, "compare"));
    } else {
        print_human_summary(&comparison, &baseline_path, &digest, &observed_path);
    }

    if !comparison.summary.is_clean() {
        std::process::exit(1);
    }
}
