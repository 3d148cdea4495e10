use anyhow::{Context, Result};
use rpm_upload_api_client::ApiClient;
use rpm_upload_runtime_config::UploaderConfig;
use rpm_upload_uploader::{BatchReport, PollPolicy, UploadOptions, UploadReference, upload_batch};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Overrides, credential_from_env, load_config};

fn upload_options(config: &UploaderConfig) -> UploadOptions {
    UploadOptions {
        chunk_size: config.upload.chunk_size,
        finalize: config.upload.finalize,
        poll: PollPolicy {
            interval: Duration::from_millis(config.poll.interval_ms),
            max_attempts: config.poll.max_attempts,
        },
        scratch_root: None,
    }
}

/// Upload `files` and attach them to `repo_uuid` in one call.
pub async fn run_upload(repo_uuid: &str, files: &[PathBuf], overrides: Overrides) -> Result<()> {
    let mut config = load_config()?;
    overrides.apply(&mut config);

    let mut client = ApiClient::new(
        &config.server.url,
        config.upload.mode,
        Duration::from_secs(config.server.timeout_secs),
    )?;
    if let Some(credential) = credential_from_env() {
        client.set_credential(credential);
    }

    println!(
        "Uploading {} file(s) to {} ({} mode)...",
        files.len(),
        config.server.url,
        config.upload.mode
    );
    let report = upload_batch(&client, repo_uuid, files, &upload_options(&config))
        .await
        .with_context(|| format!("Upload to repository {repo_uuid} failed"))?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        let reference = match &file.reference {
            UploadReference::Session(id) => format!("upload {id}"),
            UploadReference::Artifact(handle) => format!("artifact {}", handle.href),
        };
        println!(
            "  {} ({} bytes, {} chunk(s)) sha256={} -> {}",
            file.path.display(),
            file.size,
            file.chunks,
            file.sha256,
            reference
        );
    }
    println!(
        "Attached {} {} to repository {}",
        report.files.len(),
        if report.finalized { "artifact(s)" } else { "upload(s)" },
        report.repository
    );
}
