use crate::support::{read_json_or_exit, render_json_or_exit, write_json_or_exit};
use serde_json::json;
use std::path::PathBuf;
use tagwatch_compare::derive_snapshot;
use tagwatch_schema::parse_definition;

const CHECK_KIND: &str = "tagwatch.baseline.v1";

pub fn run(captured: String, out: Option<String>, json_output: bool) {
    let captured_path = PathBuf::from(captured);
    let raw = read_json_or_exit(&captured_path, "captured");

    let snapshot = derive_snapshot(&raw).unwrap_or_else(|err| {
        eprintln!("error: cannot derive baseline: {err}");
        std::process::exit(2);
    });

    let Some(out) = out else {
        println!("{}", render_json_or_exit(&snapshot, "baseline"));
        return;
    };

    let definition = parse_definition(&snapshot).unwrap_or_else(|err| {
        eprintln!("error: derived baseline does not validate: {err}");
        std::process::exit(2);
    });
    let out_path = PathBuf::from(out);
    write_json_or_exit(&out_path, &snapshot, "baseline");

    if json_output {
        let payload = json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "captured": captured_path.display().to_string(),
            "out": out_path.display().to_string(),
            "pageCount": definition.page_count(),
            "variableCount": definition.variable_count(),
            "digest": definition.digest(),
        });
        println!("{}", render_json_or_exit(&payload, "baseline"));
    } else {
        println!(
            "[baseline] wrote {} (pages={}, variables={})",
            out_path.display(),
            definition.page_count(),
            definition.variable_count()
        );
    }
}
