use rpm_upload_core::testing::{REPO_UUID, payload, write_rpm};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

// Nothing listens here; any request would fail with a connection error
// rather than the validation errors these tests expect.
const DEAD_SERVER: &str = "http://127.0.0.1:9";

fn make_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rpm-upload"))
        .args(args)
        .env("HOME", home)
        .env_remove("RPM_UPLOAD_TOKEN")
        .env_remove("BEARER_TOKEN")
        .env_remove("USERNAME")
        .env_remove("PASSWORD")
        .env_remove("IDENTITY_HEADER")
        .env_remove("RUST_LOG")
        .output()
        .expect("run rpm-upload")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn non_uuid_repository_is_rejected_before_any_request() {
    let home = make_home();
    let rpm = write_rpm(home.path(), "hello.rpm", &payload(13));

    let output = run_cli(
        home.path(),
        &[
            "upload",
            "../admin",
            rpm.to_str().expect("utf8 path"),
            "--server",
            DEAD_SERVER,
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error:"), "stderr: {err}");
    assert!(err.contains("UUID"), "stderr: {err}");
    assert!(!err.contains("request failed"), "stderr: {err}");
}

#[test]
fn non_rpm_file_is_rejected_before_any_request() {
    let home = make_home();
    let notes = home.path().join("notes.txt");
    fs::write(&notes, "not a package").expect("write file");

    let output = run_cli(
        home.path(),
        &[
            "upload",
            REPO_UUID,
            notes.to_str().expect("utf8 path"),
            "--server",
            DEAD_SERVER,
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("notes.txt"), "stderr: {err}");
    assert!(!err.contains("request failed"), "stderr: {err}");
}

#[test]
fn zero_chunk_size_flag_is_rejected() {
    let home = make_home();
    let rpm = write_rpm(home.path(), "hello.rpm", &payload(13));

    let output = run_cli(
        home.path(),
        &[
            "upload",
            REPO_UUID,
            rpm.to_str().expect("utf8 path"),
            "--chunk-size",
            "0",
            "--server",
            DEAD_SERVER,
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("chunk size"), "stderr: {}", stderr(&output));
}

#[test]
fn unknown_mode_is_a_usage_error() {
    let home = make_home();
    let output = run_cli(
        home.path(),
        &["upload", REPO_UUID, "a.rpm", "--mode", "sideways"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("sideways"));
}

#[test]
fn config_shows_defaults_without_a_file() {
    let home = make_home();
    let output = run_cli(home.path(), &["config"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("rpm-upload.toml"));
    assert!(out.contains("mode       = session-id"));
    assert!(out.contains("max_attempts = (unbounded)"));
    assert!(out.contains("credential   = (not set)"));
}

#[test]
fn config_reads_file_from_home() {
    let home = make_home();
    let dir = home.path().join(".config").join("rpm-upload");
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(
        dir.join("rpm-upload.toml"),
        r#"
[server]
url = "http://localhost:8000/api/content-sources/v1/"

[upload]
mode = "resource-locator"
finalize = true

[poll]
max_attempts = 12
"#,
    )
    .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_rpm-upload"))
        .arg("config")
        .env("HOME", home.path())
        .env("BEARER_TOKEN", "s3cret")
        .env_remove("RPM_UPLOAD_TOKEN")
        .output()
        .expect("run rpm-upload");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("url          = http://localhost:8000/api/content-sources/v1\n"));
    assert!(out.contains("mode       = resource-locator"));
    assert!(out.contains("finalize   = true"));
    assert!(out.contains("max_attempts = 12"));
    assert!(out.contains("credential   = bearer token"));
    assert!(!out.contains("s3cret"));
}

#[test]
fn malformed_config_file_fails_with_path() {
    let home = make_home();
    let dir = home.path().join(".config").join("rpm-upload");
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(dir.join("rpm-upload.toml"), "[upload\nmode = ").expect("write config");

    let output = run_cli(home.path(), &["config"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to parse config"));
}

#[test]
fn zero_poll_interval_is_a_usage_error() {
    let home = make_home();
    let rpm = write_rpm(home.path(), "hello.rpm", &payload(13));
    let output = run_cli(
        home.path(),
        &[
            "upload",
            REPO_UUID,
            rpm.to_str().expect("utf8 path"),
            "--poll-interval-ms",
            "0",
            "--server",
            DEAD_SERVER,
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--poll-interval-ms"), "stderr: {}", stderr(&output));
}
