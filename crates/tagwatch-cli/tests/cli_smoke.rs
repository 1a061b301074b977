use serde_json::{Value, json};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "tagwatch-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_tagwatch<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_tagwatch");
    Command::new(bin)
        .args(args)
        .env_remove("TAGWATCH_LOG")
        .env_remove("TAGWATCH_LOG_JSON")
        .output()
        .expect("tagwatch command should execute")
}

fn assert_exit_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "unexpected exit status\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_json(path: &Path, value: &Value) {
    fs::write(
        path,
        serde_json::to_vec_pretty(value).expect("fixture should serialize"),
    )
    .expect("fixture should be written");
}

fn lang_definition() -> Value {
    json!({"Home": {"variables": {
        "lang": {"value": ["en", "de"], "type": "str", "length": -1, "required": true}
    }}})
}

fn lang_observed(value: &str) -> Value {
    json!({"Home": {"variables": {
        "lang": {"value": [value], "type": "str", "length": value.chars().count()}
    }}})
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn validate_accepts_definition() {
    let tmp = TempDirGuard::new("validate-ok");
    let definition = tmp.path().join("definition.json");
    write_json(&definition, &lang_definition());

    let output = run_tagwatch(["validate", &path_arg(&definition)]);
    assert_exit_code(&output, 0);
    assert!(stdout_text(&output).contains("[validate] OK (pages=1, variables=1)"));

    let output = run_tagwatch(["validate", &path_arg(&definition), "--json"]);
    assert_exit_code(&output, 0);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["result"], "accepted");
    assert_eq!(payload["variableCount"], 1);
    assert!(
        payload["digest"]
            .as_str()
            .is_some_and(|digest| digest.starts_with("def1_"))
    );
}

#[test]
fn validate_rejects_non_boolean_required() {
    let tmp = TempDirGuard::new("validate-bad");
    let definition = tmp.path().join("definition.json");
    write_json(
        &definition,
        &json!({"Home": {"variables": {
            "lang": {"value": [], "type": "str", "length": -1, "required": "yes"}
        }}}),
    );

    let output = run_tagwatch(["validate", &path_arg(&definition), "--json"]);
    assert_exit_code(&output, 1);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["result"], "rejected");
    assert_eq!(payload["error"]["kind"], "required_not_boolean");
    assert_eq!(payload["error"]["page"], "Home");
    assert_eq!(payload["error"]["variable"], "lang");
}

#[test]
fn unreadable_or_invalid_inputs_exit_with_error() {
    let tmp = TempDirGuard::new("exit-codes");
    let garbage = tmp.path().join("garbage.json");
    fs::write(&garbage, "{not json").expect("garbage should be written");
    let output = run_tagwatch(["validate", &path_arg(&garbage)]);
    assert_exit_code(&output, 2);

    let bad_baseline = tmp.path().join("bad.json");
    let observed = tmp.path().join("observed.json");
    write_json(&bad_baseline, &json!({}));
    write_json(&observed, &lang_observed("en"));

    let output = run_tagwatch(["validate", &path_arg(&bad_baseline)]);
    assert_exit_code(&output, 1);
    assert!(stdout_text(&output).contains("[validate] FAIL (empty_document)"));

    let output = run_tagwatch([
        "compare",
        "--baseline",
        &path_arg(&bad_baseline),
        "--observed",
        &path_arg(&observed),
    ]);
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("no elements available"));
}

#[test]
fn compare_reports_value_regression() {
    let tmp = TempDirGuard::new("compare-fail");
    let definition = tmp.path().join("definition.json");
    let observed = tmp.path().join("observed.json");
    let out = tmp.path().join("results/result.json");
    write_json(&definition, &lang_definition());
    write_json(&observed, &lang_observed("fr"));

    let output = run_tagwatch([
        "compare",
        "--baseline",
        &path_arg(&definition),
        "--observed",
        &path_arg(&observed),
        "--out",
        &path_arg(&out),
    ]);
    assert_exit_code(&output, 1);
    let text = stdout_text(&output);
    assert!(text.contains("Result: rejected"));
    assert!(text.contains("Home / lang (-): value not in allowed set"));
    assert!(text.contains("expected: en, de"));
    assert!(text.contains("actual:   fr"));

    let written: Value =
        serde_json::from_slice(&fs::read(&out).expect("result document should be written"))
            .expect("result document should be JSON");
    assert_eq!(written["Home"]["variables"]["lang"]["error"], 1);
    assert_eq!(
        written["Home"]["variables"]["lang"]["message"],
        "value not in allowed set"
    );
}

#[test]
fn compare_json_uses_settings_mapping() {
    let tmp = TempDirGuard::new("compare-ok");
    let definition = tmp.path().join("definition.json");
    let observed = tmp.path().join("observed.json");
    let settings = tmp.path().join("settings.json");
    write_json(&definition, &lang_definition());
    write_json(&observed, &lang_observed("en"));
    write_json(
        &settings,
        &json!({
            "staging": {"urls": {"Home": "https://example.com"}, "mapping": {"lang": "Language"}},
            "live": {"mapping": {}}
        }),
    );

    let output = run_tagwatch([
        "compare",
        "--baseline",
        &path_arg(&definition),
        "--observed",
        &path_arg(&observed),
        "--settings",
        &path_arg(&settings),
        "--env",
        "staging",
        "--json",
    ]);
    assert_exit_code(&output, 0);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["result"], "accepted");
    assert_eq!(payload["summary"], json!({"succeeded": 1, "failed": 0}));
    assert_eq!(
        payload["document"]["Home"]["variables"]["lang"]["variable_mapping"],
        "Language"
    );
    assert!(payload["generatedAt"].is_string());
    assert_eq!(payload["failures"], json!([]));
}

#[test]
fn compare_missing_page_exits_with_error() {
    let tmp = TempDirGuard::new("compare-missing");
    let definition = tmp.path().join("definition.json");
    let observed = tmp.path().join("observed.json");
    let out = tmp.path().join("result.json");
    write_json(&definition, &lang_definition());
    write_json(&observed, &json!({"Search": {"variables": {}}}));

    let output = run_tagwatch([
        "compare",
        "--baseline",
        &path_arg(&definition),
        "--observed",
        &path_arg(&observed),
        "--out",
        &path_arg(&out),
    ]);
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("page `Home`"));
    assert!(!out.exists(), "no result document on abort");

    let output = run_tagwatch([
        "compare",
        "--baseline",
        &path_arg(&definition),
        "--observed",
        &path_arg(&observed),
        "--continue-on-missing-page",
        "--json",
    ]);
    assert_exit_code(&output, 1);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["summary"], json!({"succeeded": 0, "failed": 1}));
    assert_eq!(payload["document"]["Home"]["message"], "page not found");
}

#[test]
fn compare_focus_skips_result_file() {
    let tmp = TempDirGuard::new("compare-focus");
    let definition = tmp.path().join("definition.json");
    let observed = tmp.path().join("observed.json");
    let out = tmp.path().join("result.json");
    let mut full = lang_definition();
    full["Search"] = json!({"variables": {
        "q": {"value": [], "type": "*", "length": -1, "required": true}
    }});
    write_json(&definition, &full);
    write_json(&observed, &lang_observed("de"));

    let output = run_tagwatch([
        "compare",
        "--baseline",
        &path_arg(&definition),
        "--observed",
        &path_arg(&observed),
        "--focus",
        "Home",
        "--out",
        &path_arg(&out),
    ]);
    assert_exit_code(&output, 0);
    assert!(stdout_text(&output).contains("Succeeded: 1"));
    assert!(!out.exists(), "focus mode never writes the result document");
}

#[test]
fn baseline_derives_comparable_snapshot() {
    let tmp = TempDirGuard::new("baseline");
    let captured = tmp.path().join("captured.json");
    let baseline = tmp.path().join("baseline.json");
    write_json(
        &captured,
        &json!({"Home": {
            "url": "https://example.com/",
            "variables": {"pageName": ["home"], "v1": ["2024"], "v2": ["0.5"]}
        }}),
    );

    let output = run_tagwatch([
        "baseline",
        "--captured",
        &path_arg(&captured),
        "--out",
        &path_arg(&baseline),
    ]);
    assert_exit_code(&output, 0);
    assert!(stdout_text(&output).contains("(pages=1, variables=3)"));

    let derived: Value =
        serde_json::from_slice(&fs::read(&baseline).expect("baseline should be written"))
            .expect("baseline should be JSON");
    assert_eq!(derived["Home"]["variables"]["v1"]["type"], "int");
    assert_eq!(derived["Home"]["variables"]["v2"]["type"], "float");
    assert_eq!(derived["Home"]["variables"]["pageName"]["length"], 4);

    let output = run_tagwatch([
        "compare",
        "--baseline",
        &path_arg(&baseline),
        "--observed",
        &path_arg(&baseline),
        "--json",
    ]);
    assert_exit_code(&output, 0);
    assert_eq!(
        parse_json_stdout(&output)["summary"],
        json!({"succeeded": 3, "failed": 0})
    );
}
