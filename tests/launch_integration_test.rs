#![cfg(unix)]

use anyhow::Result;
use async_trait::async_trait;
use httpmock::prelude::*;
use pangenome_launch::adapters::{ExecutionToken, HttpProvisioner, LocalLogStore};
use pangenome_launch::core::ExecutionNameSource;
use pangenome_launch::{
    LaunchConfig, LaunchError, LogUpload, ParameterSet, PipelineRuntime, WorkflowLauncher,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

struct FixedName(Option<&'static str>);

#[async_trait]
impl ExecutionNameSource for FixedName {
    async fn execution_name(&self) -> Option<String> {
        self.0.map(str::to_string)
    }
}

/// Stand-in for the Nextflow launcher: records what it was given and writes
/// a `.nextflow.log` into its working directory.
fn fake_nextflow(dir: &Path, exit_code: i32) -> std::path::PathBuf {
    let script = dir.join("nextflow");
    let body = format!(
        "#!/bin/sh\n\
         printf '%s\\n' \"$@\" > args.txt\n\
         echo \"$K8S_STORAGE_CLAIM_NAME\" > pvc.txt\n\
         echo \"$NXF_DISABLE_CHECK_LATEST\" > check_latest.txt\n\
         echo \"nextflow ran\" > .nextflow.log\n\
         exit {}\n",
        exit_code
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

struct Fixture {
    bin: TempDir,
    source: TempDir,
    shared: TempDir,
    ldata: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            bin: TempDir::new().unwrap(),
            source: TempDir::new().unwrap(),
            shared: TempDir::new().unwrap(),
            ldata: TempDir::new().unwrap(),
        };
        fs::write(fixture.source.path().join("main.nf"), "workflow {}").unwrap();
        fs::write(fixture.source.path().join("latch.config"), "docker.enabled = true").unwrap();
        fs::create_dir_all(fixture.source.path().join(".nextflow/assets")).unwrap();
        fs::create_dir_all(fixture.source.path().join("miniconda/bin")).unwrap();
        fs::write(fixture.source.path().join("miniconda/bin/python"), "").unwrap();
        fixture
    }

    fn config(&self, exit_code: i32) -> LaunchConfig {
        let mut config = LaunchConfig::default();
        config.runtime.nextflow_bin = fake_nextflow(self.bin.path(), exit_code);
        config.runtime.source_dir = self.source.path().to_path_buf();
        config.runtime.shared_dir = self.shared.path().to_path_buf();
        config.logs.local_root = self.ldata.path().to_path_buf();
        config
    }

    fn uploaded_log(&self, name: &str) -> std::path::PathBuf {
        self.ldata
            .path()
            .join("your_log_dir/nf_nf_core_pangenome")
            .join(name)
            .join("nextflow.log")
    }
}

fn params() -> ParameterSet {
    let mut params = ParameterSet::new();
    params.set_assignment("input=latch:///genomes/hprc.fa.gz").unwrap();
    params.set_assignment("n_haplotypes=90").unwrap();
    params.set_assignment("outdir=latch:///pangenome").unwrap();
    params.set_assignment("wfmash_only=true").unwrap();
    params
}

#[tokio::test]
async fn test_run_stages_workdir_and_uploads_log() -> Result<()> {
    let fixture = Fixture::new();
    let config = fixture.config(0);
    let runtime = PipelineRuntime::new(
        &config,
        FixedName(Some("happy_hopper")),
        LocalLogStore::new(fixture.ldata.path()),
    )?;

    let report = runtime.run("pvc-123", &params()).await?;

    let shared = fixture.shared.path();
    assert!(shared.join("main.nf").exists());
    assert!(shared.join("latch.config").exists());
    assert!(!shared.join("miniconda").exists());
    assert!(!shared.join(".nextflow/assets").exists());

    let args = fs::read_to_string(shared.join("args.txt"))?;
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args[0], "run");
    assert_eq!(args[1], shared.join("main.nf").display().to_string().as_str());
    let shared_str = shared.display().to_string();
    assert_eq!(&args[2..4], &["-work-dir", shared_str.as_str()]);
    assert_eq!(&args[4..8], &["-profile", "docker", "-c", "latch.config"]);
    assert_eq!(&args[8..10], &["--input", "latch:///genomes/hprc.fa.gz"]);
    assert_eq!(&args[10..12], &["--n_haplotypes", "90.0"]);
    assert!(args.contains(&"--wfmash_only"));
    assert!(args.contains(&"--wfmash_map_pct_id"));

    assert_eq!(fs::read_to_string(shared.join("pvc.txt"))?.trim(), "pvc-123");
    assert_eq!(fs::read_to_string(shared.join("check_latest.txt"))?.trim(), "true");

    assert_eq!(report.pvc_name, "pvc-123");
    assert!(matches!(report.log, LogUpload::Uploaded(_)));
    assert_eq!(
        fs::read_to_string(fixture.uploaded_log("happy_hopper"))?.trim(),
        "nextflow ran"
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_run_still_uploads_log() -> Result<()> {
    let fixture = Fixture::new();
    let config = fixture.config(7);
    let runtime = PipelineRuntime::new(
        &config,
        FixedName(Some("sad_hopper")),
        LocalLogStore::new(fixture.ldata.path()),
    )?;

    let err = runtime.run("pvc-123", &params()).await.unwrap_err();

    assert!(matches!(err, LaunchError::PipelineFailed { code: Some(7) }));
    assert!(fixture.uploaded_log("sad_hopper").is_file());
    Ok(())
}

#[tokio::test]
async fn test_failed_run_without_execution_name_skips_upload() -> Result<()> {
    let fixture = Fixture::new();
    let config = fixture.config(1);
    let runtime = PipelineRuntime::new(
        &config,
        FixedName(None),
        LocalLogStore::new(fixture.ldata.path()),
    )?;

    let err = runtime.run("pvc-123", &params()).await.unwrap_err();

    assert!(matches!(err, LaunchError::PipelineFailed { .. }));
    assert_eq!(fs::read_dir(fixture.ldata.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_launch_provisions_then_runs() -> Result<()> {
    let fixture = Fixture::new();
    let config = fixture.config(0);

    let server = MockServer::start();
    let provision_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/provision-storage")
            .header("Authorization", "Latch-Execution-Token exec-1")
            .json_body(serde_json::json!({ "storage_gib": 100 }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "name": "pvc-from-dispatcher" }));
    });

    let provisioner = HttpProvisioner::new(server.base_url(), ExecutionToken::new("exec-1"));
    let runtime = PipelineRuntime::new(
        &config,
        FixedName(Some("launched")),
        LocalLogStore::new(fixture.ldata.path()),
    )?;
    let launcher = WorkflowLauncher::new(provisioner, runtime, config.platform.storage_gib);

    let report = launcher.launch(&params()).await?;

    provision_mock.assert();
    assert_eq!(report.pvc_name, "pvc-from-dispatcher");
    assert_eq!(
        fs::read_to_string(fixture.shared.path().join("pvc.txt"))?.trim(),
        "pvc-from-dispatcher"
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_provisioning_never_runs_pipeline() -> Result<()> {
    let fixture = Fixture::new();
    let config = fixture.config(0);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/provision-storage");
        then.status(500);
    });

    let provisioner = HttpProvisioner::new(server.base_url(), ExecutionToken::new("exec-1"));
    let runtime = PipelineRuntime::new(
        &config,
        FixedName(Some("never")),
        LocalLogStore::new(fixture.ldata.path()),
    )?;
    let launcher = WorkflowLauncher::new(provisioner, runtime, 100);

    let err = launcher.launch(&params()).await.unwrap_err();

    assert!(matches!(err, LaunchError::HttpError(_)));
    assert!(!fixture.shared.path().join("args.txt").exists());
    Ok(())
}

#[test]
fn test_plan_has_no_side_effects() {
    let fixture = Fixture::new();
    let config = fixture.config(0);
    let runtime = PipelineRuntime::new(
        &config,
        FixedName(None),
        LocalLogStore::new(fixture.ldata.path()),
    )
    .unwrap();

    let command = runtime.plan("pvc-x", &params()).unwrap();
    assert!(command.display_line().contains("--wfmash_only"));
    assert!(!fixture.shared.path().join("main.nf").exists());

    let upload = tokio_test::block_on(runtime.upload_log()).unwrap();
    assert_eq!(upload, LogUpload::NoLogFile);
}
