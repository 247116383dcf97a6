use assert_cmd::Command;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn run(home: &Path, tree: &Path, args: &[&str], expect_code: i32) {
    let mut cmd = Command::cargo_bin("comply").expect("comply binary");
    cmd.env("HOME", home)
        .args(["--json", "--root", tree.to_str().expect("tree utf8")])
        .args(args)
        .assert()
        .code(expect_code);
}

fn load_schema(name: &str) -> Value {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(root.join("docs/contracts").join(name)).expect("schema file");
    serde_json::from_str(&raw).expect("schema json")
}

fn validate(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = JSONSchema::compile(&schema).expect("compile schema");
    let msgs: Vec<String> = match validator.validate(data) {
        Ok(()) => return,
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };
    panic!("schema validation failed: {}", msgs.join(" | "));
}

fn make_fixture_tree(base: &Path) -> PathBuf {
    let tree = base.join("tree");
    fs::create_dir_all(tree.join("src/web5")).expect("create web5 dir");
    fs::create_dir_all(tree.join("docs")).expect("create docs dir");
    fs::write(
        tree.join("src/web5/resolver.rs"),
        "// [W5C-3] [DID-2]\nfn resolve() {}\n",
    )
    .expect("write resolver");
    fs::write(tree.join("docs/readme.md"), "intro text\n").expect("write readme");
    tree
}

#[test]
fn report_artifact_matches_contract() {
    let tmp = TempDir::new().expect("tempdir");
    let home = tmp.path().join("home");
    fs::create_dir_all(&home).expect("create home");
    let tree = make_fixture_tree(tmp.path());
    let artifact = tmp.path().join("out/report.json");

    // the doc file is unlabeled, so validate gates; the artifact is still
    // produced from the completed records
    run(
        &home,
        &tree,
        &["validate", "--report", artifact.to_str().expect("utf8")],
        1,
    );
    let raw = fs::read_to_string(&artifact).expect("artifact written");
    let report: Value = serde_json::from_str(&raw).expect("artifact json");
    validate("report.schema.json", &report);

    run(&home, &tree, &["fix"], 0);
    let fixed_artifact = tmp.path().join("out/fixed.json");
    run(
        &home,
        &tree,
        &["validate", "--report", fixed_artifact.to_str().expect("utf8")],
        0,
    );
    let raw = fs::read_to_string(&fixed_artifact).expect("artifact written");
    let report: Value = serde_json::from_str(&raw).expect("artifact json");
    validate("report.schema.json", &report);
    assert_eq!(report["summary"]["unlabeled"], 0);
}
