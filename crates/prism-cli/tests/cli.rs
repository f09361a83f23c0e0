//! End-to-end tests of the `prism` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (path, content) in files {
        let file = temp.path().join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }
    temp
}

fn prism(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("prism").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("PRISM_ROOT")
        .env_remove("PRISM_ENTRYPOINTS")
        .env_remove("PRISM_MAX_FILE_SIZE")
        .env_remove("PRISM_EXTERNAL_PACKAGES");
    cmd
}

#[test]
fn clean_package_succeeds() {
    let temp = project(&[
        ("my-app.html", "<script>Polymer({is: 'my-app'});</script>"),
        ("node_modules/dep/broken.js", "this is not javascript ((("),
    ]);

    prism(temp.path())
        .arg("analyze")
        .assert()
        .success()
        .stderr(predicate::str::contains("Analyzed 1 document(s): 0 error(s), 0 warning(s)"));
}

#[test]
fn errors_fail_the_process() {
    let temp = project(&[(
        "my-app.html",
        "<link rel=\"import\" href=\"missing.html\">\n<script>Polymer({is: 'my-app'});</script>",
    )]);

    prism(temp.path())
        .args(["analyze", "my-app.html"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("my-app.html"))
        .stdout(predicate::str::contains("could-not-load"))
        .stdout(predicate::str::contains("Unable to load import"));
}

#[test]
fn plain_warnings_do_not_fail() {
    let temp = project(&[(
        "my-app.html",
        "<script>Polymer({is: 'my-app', behaviors: [MissingBehavior]});</script>",
    )]);

    prism(temp.path())
        .args(["analyze", "my-app.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown-polymer-behavior"));
}

#[test]
fn json_output_is_machine_readable() {
    let temp = project(&[("a.js", "class {"), ("b.js", "class B {}")]);

    let output = prism(temp.path())
        .args(["analyze", "--format", "json", "-q"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["documents"], 2);
    assert_eq!(report["errors"], 1);
    assert_eq!(report["files"][0]["url"], "a.js");
    assert_eq!(report["files"][0]["warnings"][0]["code"], "parse-error");
}

#[test]
fn root_flag_and_config_file() {
    let temp = project(&[
        ("prism.json", r#"{"root": "elements", "entrypoints": ["x-a.html"]}"#),
        ("elements/x-a.html", "<script>Polymer({is: 'x-a'});</script>"),
        ("elements/x-b.html", "<link rel=\"import\" href=\"nowhere.html\">"),
    ]);

    prism(temp.path()).arg("analyze").assert().success();

    prism(temp.path())
        .args(["analyze", "x-b.html"])
        .assert()
        .code(1);

    let other = project(&[("x-c.html", "")]);
    prism(temp.path())
        .args(["analyze", "x-c.html", "--root"])
        .arg(other.path())
        .assert()
        .success();
}

#[test]
fn explicit_config_must_exist() {
    let temp = project(&[]);
    prism(temp.path())
        .args(["--config", "nope.json", "analyze"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn missing_root_is_reported() {
    let temp = project(&[]);
    prism(temp.path())
        .args(["analyze", "--root", "not-a-dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Package root not found"));
}

#[test]
fn features_lists_what_a_document_sees() {
    let temp = project(&[
        ("app.html", "<link rel=\"import\" href=\"lib.html\">\n<script>Polymer({is: 'my-app'});</script>"),
        ("lib.html", "<script>/** @polymerBehavior */ LibBehavior = {};</script>"),
    ]);

    prism(temp.path())
        .args(["features", "app.html", "--kind", "polymer-element"])
        .assert()
        .success()
        .stdout(predicate::str::contains("my-app"))
        .stdout(predicate::str::contains("LibBehavior").not());

    prism(temp.path())
        .args(["features", "app.html", "--kind", "behavior"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LibBehavior"));

    prism(temp.path())
        .args(["features", "app.html", "--kind", "behavior", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn features_as_json() {
    let temp = project(&[("x.js", "class XA extends HTMLElement {}\ncustomElements.define('x-a', XA);")]);

    let output = prism(temp.path())
        .args(["features", "x.js", "--kind", "element", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let features: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(features[0]["feature"], "element");
    assert_eq!(features[0]["tag_name"], "x-a");
    assert_eq!(features[0]["class_name"], "XA");
}

#[test]
fn features_of_unloadable_documents_fail() {
    let temp = project(&[]);
    prism(temp.path())
        .args(["features", "ghost.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not analyze ghost.html"));
}
