use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pageaudit"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run pageaudit")
}

fn run_json(args: &[&str]) -> Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "pageaudit failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn help_and_version() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--lighthouse"));

    let output = run(&["--version"]);
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("pageaudit "));
}

#[test]
fn record_to_json() {
    let record = fixture("record.json");
    let report = run_json(&["--record", record.to_str().unwrap(), "--json", "--no-probe"]);

    let metrics = &report["metrics"];
    assert_eq!(metrics["version"], 1);
    assert_eq!(metrics["userId"], "user-42");
    assert_eq!(metrics["url"], "https://example.com/guides/fast-pages");

    let seo = &metrics["seo"];
    assert_eq!(seo["titleLength"], 48);
    assert_eq!(seo["titleMessage"], "TITLE_SHORT");
    assert_eq!(seo["descriptionMessage"], "DESCRIPTION_SHORT");
    assert_eq!(seo["canonical"]["present"], true);
    assert_eq!(seo["seoFriendlyUrl"], true);
    assert_eq!(seo["headings"]["h1MatchesTitle"], true);
    assert_eq!(seo["headings"]["sequence"]["skippedLevels"][0], "h2");
    assert_eq!(seo["links"]["internalCount"], 1);
    assert_eq!(seo["links"]["externalCount"], 1);
    assert_eq!(seo["links"]["violations"].as_array().unwrap().len(), 2);

    assert_eq!(metrics["security"]["https"], true);
    assert_eq!(metrics["security"]["hstsEnabled"], true);
    assert_eq!(metrics["performance"]["textCompression"], true);

    let misc = &metrics["miscellaneous"];
    assert_eq!(misc["charset"], "UTF-8");
    assert_eq!(misc["language"], "en");
    assert_eq!(misc["structuredData"][0], "Article");
    assert_eq!(misc["sitemapFound"], false);
    assert_eq!(misc["crawlAllowed"], true);

    let content = &report["content"];
    assert!(content["totalWords"].as_u64().unwrap() > 10);
    assert!(content["wordFrequency"]["visitors"].as_u64().unwrap() >= 2);
    assert_eq!(content["readingTime"]["text"], "1 min read");

    assert_eq!(report["headingTree"][1]["parent"], "Fast pages: a practical guide to web performance");
}

#[test]
fn config_overrides_bands() {
    let record = fixture("record.json");
    let config = fixture("config.json");
    let report = run_json(&[
        "--record",
        record.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--json",
        "--no-probe",
    ]);
    assert_eq!(report["metrics"]["seo"]["titleMessage"], "TITLE_OPTIMAL");
}

#[test]
fn record_without_url_fails() {
    let record = fixture("record-no-url.json");
    let output = run(&["--record", record.to_str().unwrap(), "--no-probe"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no URL"));
    assert!(output.stdout.is_empty());
}

#[test]
fn text_summary_for_record() {
    let record = fixture("record.json");
    let output = run(&["--record", record.to_str().unwrap(), "--no-probe"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("SEO: https://example.com/guides/fast-pages"));
    assert!(text.contains("TITLE_SHORT"));
    assert!(text.contains("Security"));
    assert!(text.contains("Reading time"));
}

#[test]
fn lighthouse_seo_family() {
    let report = fixture("lighthouse.json");
    let audit = run_json(&["--lighthouse", report.to_str().unwrap(), "--family", "seo", "--json"]);

    assert_eq!(audit["family"], "seo");
    assert_eq!(audit["score"], 67);
    assert_eq!(audit["reportedScore"], 67);
    assert_eq!(audit["passed"].as_array().unwrap().len(), 2);
    assert_eq!(audit["failed"][0]["id"], "meta-description");
    assert_eq!(audit["failed"][0]["priority"], "high");
    assert_eq!(audit["manual"][0]["id"], "structured-data");
}

#[test]
fn lighthouse_all_families() {
    let report = fixture("lighthouse.json");
    let audits = run_json(&["--lighthouse", report.to_str().unwrap(), "--json"]);
    let audits = audits.as_array().unwrap();
    assert_eq!(audits.len(), 3);

    let accessibility = &audits[0];
    assert_eq!(accessibility["family"], "accessibility");
    assert_eq!(accessibility["score"], 67);
    assert_eq!(accessibility["failed"][0]["id"], "color-contrast");
    assert!(
        accessibility["manual"]
            .as_array()
            .unwrap()
            .iter()
            .all(|m| m["feedback"] == "Metric data is not available.")
    );

    let performance = &audits[1];
    assert_eq!(performance["score"], 95);
    assert_eq!(performance["reportedScore"], 95);
}

#[test]
fn save_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let report = fixture("lighthouse.json");
    let output = run(&[
        "--lighthouse",
        report.to_str().unwrap(),
        "--family",
        "performance",
        "--save",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let saved = dir.path().join("lighthouse__audit.txt");
    let contents = std::fs::read_to_string(&saved).unwrap();
    assert_eq!(contents, String::from_utf8_lossy(&output.stdout));
    assert!(contents.contains("Lighthouse: performance"));
}

#[test]
fn bad_arguments_fail() {
    assert!(!run(&["--bogus"]).status.success());
    let missing = fixture("does-not-exist.json");
    let output = run(&["--lighthouse", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read audit report"));
}
