use crate::support::{read_json_or_exit, render_json_or_exit};
use serde_json::json;
use std::path::PathBuf;
use tagwatch_schema::parse_definition;

const CHECK_KIND: &str = "tagwatch.validate.v1";

pub fn run(document: String, json_output: bool) {
    let document_path = PathBuf::from(document);
    let raw = read_json_or_exit(&document_path, "document");

    match parse_definition(&raw) {
        Ok(definition) => {
            if json_output {
                let payload = json!({
                    "schema": 1,
                    "checkKind": CHECK_KIND,
                    "document": document_path.display().to_string(),
                    "result": "accepted",
                    "pageCount": definition.page_count(),
                    "variableCount": definition.variable_count(),
                    "digest": definition.digest(),
                });
                println!("{}", render_json_or_exit(&payload, "validate"));
            } else {
                println!(
                    "[validate] OK (pages={}, variables={})",
                    definition.page_count(),
                    definition.variable_count()
                );
            }
        }
        Err(error) => {
            if json_output {
                let payload = json!({
                    "schema": 1,
                    "checkKind": CHECK_KIND,
                    "document": document_path.display().to_string(),
                    "result": "rejected",
                    "error": error,
                });
                println!("{}", render_json_or_exit(&payload, "validate"));
            } else {
                println!("[validate] FAIL ({})", error.kind.as_str());
                println!("  - {error}");
            }
            std::process::exit(1);
        }
    }
}
