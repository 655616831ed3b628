//! Integration tests for the authorlist CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PEOPLE: &str = "\
id,last,first,email,alt email,phone,group,status,signature,affil1,affil2,affil3,orcid
p1,Smith,Alice,alice@mit.edu,,,,,\"Smith, A.\",mit,,,0000-0001-2345-6789
p2,Lee,Bob,bob@mit.edu,bob@gmail.com,,,,\"Lee, B.\",mit,lapp,,
p3,Müller,Zoë,zoe@lapp.fr,,,,,\"Müller, Z.\",lapp,,,
p4,Nobody,Nora,nora@lapp.fr,,,,,\"Nobody, N.\",lapp,,,
";

const PLACES: &str = "\
mit,MIT,USA,\"77 Massachusetts Ave, Cambridge\"
lapp,LAPP,France,Annecy & Université Savoie
";

const SIGNERS: &str = "\
timestamp,email,first,last
2024-05-01,alice@mit.edu,Alice,Smith
2024-05-01,bob.lee@old-lab.org,Bob,Lee
2024-05-02,ZOE@LAPP.FR,Zoë,Müller
";

const ALT_EMAILS: &str = "\
bob.lee@old-lab.org,bob@mit.edu
";

/// Helper to get an authorlist command isolated from the user's config
fn authorlist(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("authorlist").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .env("HOME", tmp.path())
        .env_remove("AUTHORLIST_CONFIG")
        .env_remove("AUTHORLIST_TITLE")
        .env_remove("AUTHORLIST_DATA_DIR");
    cmd
}

/// Helper to write the four source tables into `data/`
fn setup_sources() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("people.csv"), PEOPLE).unwrap();
    fs::write(data.join("places.csv"), PLACES).unwrap();
    fs::write(data.join("signers.csv"), SIGNERS).unwrap();
    fs::write(data.join("alt_emails.csv"), ALT_EMAILS).unwrap();
    tmp
}

/// Helper to build authors.json in the temp directory
fn build(tmp: &TempDir) {
    authorlist(tmp)
        .args([
            "build",
            "-d",
            "data",
            "-c",
            "p1",
            "--title",
            "Gamma rays",
            "--date",
            "2024-05-01",
        ])
        .assert()
        .success();
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    authorlist(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Collaboration author list builder"));
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    let tmp = TempDir::new().unwrap();
    authorlist(&tmp)
        .args(["--quiet", "--verbose", "schema"])
        .assert()
        .failure();
}

// ============================================================================
// Build
// ============================================================================

#[test]
fn test_build_writes_sorted_author_list() {
    let tmp = setup_sources();
    build(&tmp);

    let doc = read_json(&tmp.path().join("authors.json"));
    let ids: Vec<&str> = doc["authors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["author_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["p2", "p3", "p1"]);

    let places: Vec<&str> = doc["affiliations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["place_id"].as_str().unwrap())
        .collect();
    assert_eq!(places, ["mit", "lapp"]);

    assert_eq!(doc["authors"][2]["corresponding"], true);
    assert_eq!(doc["authors"][0]["affil_num_strs"], serde_json::json!(["1", "2"]));
    assert_eq!(doc["title_unicode"], "Gamma rays");
    assert_eq!(doc["date"], "2024-05-01");
}

#[test]
fn test_build_reports_summary_line() {
    let tmp = setup_sources();
    authorlist(&tmp)
        .args(["build", "-d", "data", "--date", "2024-05-01"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 3 authors and 2 affiliations"));
}

#[test]
fn test_build_to_stdout() {
    let tmp = setup_sources();
    authorlist(&tmp)
        .args(["build", "-d", "data", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"author_id\": \"p3\""));
    assert!(!tmp.path().join("authors.json").exists());
}

#[test]
fn test_build_unknown_signer_warns() {
    let tmp = setup_sources();
    let signers = format!("{}2024-05-03,stranger@nowhere.org,Some,One\n", SIGNERS);
    fs::write(tmp.path().join("data/signers.csv"), signers).unwrap();

    authorlist(&tmp)
        .args(["build", "-d", "data"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown person: stranger@nowhere.org"));
}

#[test]
fn test_build_strict_fails_on_warnings() {
    let tmp = setup_sources();
    let signers = format!("{}2024-05-03,stranger@nowhere.org,Some,One\n", SIGNERS);
    fs::write(tmp.path().join("data/signers.csv"), signers).unwrap();

    authorlist(&tmp)
        .args(["build", "-d", "data", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--strict"));
    // The list is still written so the warning can be inspected
    assert!(tmp.path().join("authors.json").exists());
}

#[test]
fn test_build_without_alt_emails_drops_signer() {
    let tmp = setup_sources();
    authorlist(&tmp)
        .args(["build", "-d", "data", "--no-alt-emails"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown person: bob.lee@old-lab.org"));

    let doc = read_json(&tmp.path().join("authors.json"));
    assert_eq!(doc["authors"].as_array().unwrap().len(), 2);
}

#[test]
fn test_build_missing_data_dir_fails() {
    let tmp = TempDir::new().unwrap();
    authorlist(&tmp)
        .args(["build", "-d", "does-not-exist"])
        .assert()
        .failure();
}

#[test]
fn test_build_short_row_fails() {
    let tmp = setup_sources();
    fs::write(tmp.path().join("data/places.csv"), "mit,MIT,USA\n").unwrap();
    authorlist(&tmp)
        .args(["build", "-d", "data"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("address"));
}

#[test]
fn test_build_uses_project_config() {
    let tmp = setup_sources();
    fs::write(
        tmp.path().join("authorlist.yaml"),
        "data_dir: data\ncorresponding: [p3]\ntitle: From config\n",
    )
    .unwrap();

    authorlist(&tmp)
        .args(["build", "--date", "2024-05-01"])
        .assert()
        .success();

    let doc = read_json(&tmp.path().join("authors.json"));
    assert_eq!(doc["title_unicode"], "From config");
    assert_eq!(doc["authors"][1]["author_id"], "p3");
    assert_eq!(doc["authors"][1]["corresponding"], true);
}

// ============================================================================
// Render
// ============================================================================

#[test]
fn test_render_mnras() {
    let tmp = setup_sources();
    build(&tmp);

    authorlist(&tmp)
        .args(["render", "-s", "mnras"])
        .assert()
        .success()
        .stderr(predicate::str::contains("as mnras"));

    let tex = fs::read_to_string(tmp.path().join("authors.tex")).unwrap();
    assert!(tex.contains("\\documentclass"));
    assert!(tex.contains("mnras"));
    assert!(tex.contains("Smith"));
    assert!(tex.contains("\\end{document}"));
}

#[test]
fn test_render_aa_to_stdout() {
    let tmp = setup_sources();
    build(&tmp);

    authorlist(&tmp)
        .args(["render", "-s", "aa", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\\documentclass"))
        .stdout(predicate::str::contains("longauth"));
}

#[test]
fn test_render_xml() {
    let tmp = setup_sources();
    build(&tmp);

    authorlist(&tmp)
        .args(["render", "-s", "xml", "-r", "Draft A & B"])
        .assert()
        .success();

    let xml = fs::read_to_string(tmp.path().join("authors.xml")).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("Draft A &amp; B"));
    assert!(xml.contains("0000-0001-2345-6789"));
    assert!(!xml.contains("https://orcid.org/"));
}

#[test]
fn test_render_csv() {
    let tmp = setup_sources();
    build(&tmp);

    authorlist(&tmp)
        .args(["render", "-s", "csv", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("B. Lee,\n"));
}

#[test]
fn test_render_rejects_invalid_input() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("authors.json"), "{\"authors\": []}").unwrap();
    authorlist(&tmp)
        .args(["render", "-s", "csv"])
        .assert()
        .failure();
}

// ============================================================================
// Validate / Summary / Schema
// ============================================================================

#[test]
fn test_validate_built_list() {
    let tmp = setup_sources();
    build(&tmp);

    authorlist(&tmp)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 authors, 2 affiliations"));
}

#[test]
fn test_validate_reports_broken_reference() {
    let tmp = setup_sources();
    build(&tmp);

    let path = tmp.path().join("authors.json");
    let mut doc = read_json(&path);
    doc["authors"][0]["affil_nums"] = serde_json::json!([0, 7]);
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    authorlist(&tmp).arg("validate").assert().failure();
}

#[test]
fn test_validate_missing_file() {
    let tmp = TempDir::new().unwrap();
    authorlist(&tmp)
        .args(["validate", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_summary_counts_countries() {
    let tmp = setup_sources();
    build(&tmp);

    authorlist(&tmp)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("USA"))
        .stdout(predicate::str::contains("France"));
}

#[test]
fn test_schema_raw_is_json() {
    let tmp = TempDir::new().unwrap();
    let output = authorlist(&tmp).args(["schema", "--raw"]).output().unwrap();
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["definitions"]["author"].is_object());
}

#[test]
fn test_schema_summary_lists_fields() {
    let tmp = TempDir::new().unwrap();
    authorlist(&tmp)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("author_latex"))
        .stdout(predicate::str::contains("place_key"));
}

// ============================================================================
// Publish / Config / Completions
// ============================================================================

#[test]
fn test_publish_copies_into_store() {
    let tmp = setup_sources();
    build(&tmp);
    let store = tmp.path().join("store");
    fs::create_dir_all(&store).unwrap();

    authorlist(&tmp)
        .args(["publish", "authors.json", "--store", "store", "--as", "drafts/v1.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published"));

    let published = fs::read(store.join("drafts/v1.json")).unwrap();
    assert_eq!(published, fs::read(tmp.path().join("authors.json")).unwrap());
}

#[test]
fn test_publish_rejects_escaping_path() {
    let tmp = setup_sources();
    build(&tmp);
    fs::create_dir_all(tmp.path().join("store")).unwrap();

    authorlist(&tmp)
        .args(["publish", "authors.json", "--store", "store", "--as", "../out.json"])
        .assert()
        .failure();
    assert!(!tmp.path().join("out.json").exists());
}

#[test]
fn test_config_show_reflects_project_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("authorlist.yaml"), "collaboration: LST\n").unwrap();

    authorlist(&tmp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("collaboration: LST"));
}

#[test]
fn test_config_rejects_bad_yaml() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("custom.yaml"), "corresponding: [unclosed\n").unwrap();

    authorlist(&tmp)
        .args(["--config", "custom.yaml", "config", "show"])
        .assert()
        .failure();
}

#[test]
fn test_build_fails_on_broken_project_config() {
    let tmp = setup_sources();
    fs::write(
        tmp.path().join("authorlist.yaml"),
        "title: Custom\nlayout:\n  people: [oops\n",
    )
    .unwrap();

    authorlist(&tmp)
        .args(["build", "-d", "data"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("authorlist.yaml"));
    assert!(!tmp.path().join("authors.json").exists());
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    authorlist(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("authorlist"));
}
