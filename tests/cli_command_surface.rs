use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_talos"))
        .args(args)
        .env("HOME", home)
        .env_remove("TALOS_API_BASE")
        .env_remove("TALOS_ADMIN_API_BASE")
        .output()
        .expect("run talos")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn assert_err_contains(output: &Output, needle: &str) {
    assert!(
        !output.status.success(),
        "expected failure, stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
    let text = format!("{}{}", stdout(output), stderr(output));
    assert!(
        text.contains(needle),
        "expected error to contain `{needle}`, got:\n{text}"
    );
}

fn kv_lines(output: &Output) -> BTreeMap<String, String> {
    stdout(output)
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn no_arguments_prints_help() {
    let temp = tempdir().expect("tempdir");
    let output = run(temp.path(), &[]);
    assert_ok(&output);
    let out = stdout(&output);
    assert!(out.starts_with("Talos\n"));
    assert!(out.contains("setup [--legacy]"));
    assert!(out.contains("admin encryption-key <app> <height>"));
}

#[test]
fn unknown_command_fails() {
    let temp = tempdir().expect("tempdir");
    assert_err_contains(&run(temp.path(), &["deploy"]), "unknown command `deploy`");
}

#[test]
fn validate_accepts_and_rejects_values() {
    let temp = tempdir().expect("tempdir");

    let ok = run(temp.path(), &["validate", "dns", "seed.bosagora.io"]);
    assert_ok(&ok);
    let values = kv_lines(&ok);
    assert_eq!(values.get("field").map(String::as_str), Some("dns"));
    assert_eq!(values.get("valid").map(String::as_str), Some("true"));

    let short_seed = run(temp.path(), &["validate", "seed", "Sabc"]);
    assert_err_contains(&short_seed, "The Secret Seed provided is too short");

    let bad_address = run(temp.path(), &["validate", "address", "node-1"]);
    assert_err_contains(&bad_address, "Please enter a valid value: (userinfo@");

    let zero_port = run(temp.path(), &["validate", "port", "0"]);
    assert_err_contains(&zero_port, "Please enter a valid value: 1-65535");

    assert_err_contains(
        &run(temp.path(), &["validate", "quorum", "66%"]),
        "usage: validate",
    );
}

#[test]
fn validate_seed_follows_configured_case_rule() {
    let temp = tempdir().expect("tempdir");
    let upper_seed = format!("S{}", "Q".repeat(55));

    assert_err_contains(
        &run(temp.path(), &["validate", "seed", &upper_seed]),
        "Invalid input value",
    );

    fs::create_dir_all(temp.path().join(".talos")).expect("config dir");
    fs::write(
        temp.path().join(".talos/config.yaml"),
        "seed_case: insensitive\n",
    )
    .expect("write config");
    assert_ok(&run(temp.path(), &["validate", "seed", &upper_seed]));
}

#[test]
fn config_init_show_and_path() {
    let temp = tempdir().expect("tempdir");
    let config_path = temp.path().join(".talos/config.yaml");

    let path = run(temp.path(), &["config", "path"]);
    assert_ok(&path);
    assert_eq!(
        kv_lines(&path).get("path").map(String::as_str),
        Some(config_path.display().to_string().as_str())
    );

    let init = run(temp.path(), &["config", "init"]);
    assert_ok(&init);
    assert_eq!(
        kv_lines(&init).get("config").map(String::as_str),
        Some("created")
    );
    assert!(config_path.is_file());

    assert_err_contains(&run(temp.path(), &["config", "init"]), "already exists");

    fs::write(
        &config_path,
        "api_base_url: http://10.1.1.1:2827\nsubmit_format: yaml\n",
    )
    .expect("rewrite config");
    let show = run(temp.path(), &["config", "show"]);
    assert_ok(&show);
    let values = kv_lines(&show);
    assert_eq!(
        values.get("api_base_url").map(String::as_str),
        Some("http://10.1.1.1:2827")
    );
    assert_eq!(values.get("submit_format").map(String::as_str), Some("yaml"));
    assert_eq!(values.get("seed_case").map(String::as_str), Some("strict"));
    assert_eq!(
        values.get("default_dns_seed").map(String::as_str),
        Some("seed.bosagora.io")
    );
}

#[test]
fn config_show_reports_invalid_settings() {
    let temp = tempdir().expect("tempdir");
    fs::create_dir_all(temp.path().join(".talos")).expect("config dir");
    fs::write(
        temp.path().join(".talos/config.yaml"),
        "api_base_url: ftp://10.1.1.1\n",
    )
    .expect("write config");

    assert_err_contains(&run(temp.path(), &["config", "show"]), "api_base_url");
}
