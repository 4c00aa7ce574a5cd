use clap::Parser;
use pangenome_launch::adapters::{
    ExecutionToken, HttpLogStore, HttpProvisioner, LocalLogStore, PlatformExecutionNames,
};
use pangenome_launch::config::{Commands, LaunchConfig, LogBackend, ParamArgs};
use pangenome_launch::core::schema;
use pangenome_launch::domain::ports::LogStore;
use pangenome_launch::utils::error::ErrorSeverity;
use pangenome_launch::utils::{logger, validation::Validate};
use pangenome_launch::{
    initialize, Cli, LaunchError, LogUpload, ParameterSet, PipelineRuntime, RunReport,
    WorkflowLauncher,
};
use std::time::Duration;

const MONITOR_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Launch failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> Result<(), LaunchError> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Schema => {
            println!("{}", schema::to_json()?);
        }
        Commands::Initialize => {
            let token = ExecutionToken::from_env(&config.platform.token_env)?;
            let provisioner = HttpProvisioner::new(&config.platform.dispatcher_url, token);
            let pvc_name = initialize(&provisioner, config.platform.storage_gib).await?;
            println!("{}", pvc_name);
        }
        Commands::Run {
            pvc,
            params,
            monitor,
        } => {
            let params = collect_params(&config, &params)?;
            let runtime = build_runtime(&config, monitor)?;
            let report = runtime.run(&pvc, &params).await?;
            print_report(&report);
        }
        Commands::Launch { params, monitor } => {
            let params = collect_params(&config, &params)?;
            let token = ExecutionToken::from_env(&config.platform.token_env)?;
            let provisioner = HttpProvisioner::new(&config.platform.dispatcher_url, token);
            let runtime = build_runtime(&config, monitor)?;
            let launcher = WorkflowLauncher::new(provisioner, runtime, config.platform.storage_gib);
            let report = launcher.launch(&params).await?;
            print_report(&report);
        }
        Commands::Plan { pvc, params } => {
            let params = collect_params(&config, &params)?;
            let runtime = build_runtime(&config, false)?;
            let command = runtime.plan(&pvc, &params)?;

            println!("🔍 Dry run - nothing will be executed");
            println!();
            println!("  Copy: {} -> {}", config.runtime.source_dir.display(), config.runtime.shared_dir.display());
            println!("  Excluding: {}", config.runtime.exclude.join(", "));
            println!();
            println!("  Command:");
            println!("    {}", command.display_line());
            println!();
            println!("  Environment:");
            for (key, value) in &command.env {
                println!("    {}={}", key, value);
            }
            println!();
            println!("  Log upload: {}/<execution name>/nextflow.log", config.platform.log_dir.trim_end_matches('/'));
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<LaunchConfig, LaunchError> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            LaunchConfig::from_file(path)?
        }
        None => LaunchConfig::default(),
    };
    config.validate()?;
    tracing::debug!("Configuration: {:?}", config);
    Ok(config)
}

fn collect_params(config: &LaunchConfig, args: &ParamArgs) -> Result<ParameterSet, LaunchError> {
    let mut params = config.parameter_set()?;
    args.apply(&mut params)?;
    tracing::debug!("{} parameters supplied", params.len());
    Ok(params)
}

fn build_runtime(
    config: &LaunchConfig,
    monitor: bool,
) -> Result<PipelineRuntime<PlatformExecutionNames, Box<dyn LogStore>>, LaunchError> {
    let token = ExecutionToken::from_env(&config.platform.token_env).ok();
    let names = PlatformExecutionNames::new(config.platform.api_url.clone(), token.clone());

    let logs: Box<dyn LogStore> = match config.logs.backend {
        LogBackend::Local => Box::new(LocalLogStore::new(&config.logs.local_root)),
        LogBackend::Http => {
            let upload_url = config.logs.upload_url.clone().ok_or_else(|| {
                LaunchError::MissingConfigError {
                    field: "logs.upload_url".to_string(),
                }
            })?;
            Box::new(HttpLogStore::new(upload_url, token))
        }
    };

    let runtime = PipelineRuntime::new(config, names, logs)?;
    Ok(if monitor {
        tracing::info!("🔍 Pipeline monitoring enabled");
        runtime.with_monitoring(MONITOR_INTERVAL)
    } else {
        runtime
    })
}

fn print_report(report: &RunReport) {
    let elapsed = report.finished_at - report.started_at;
    println!("✅ Pipeline completed on volume {}", report.pvc_name);
    println!("⏱️  Wall time: {}s", elapsed.num_seconds());
    match &report.log {
        LogUpload::Uploaded(remote) => println!("📁 Log uploaded to: {}", remote),
        LogUpload::NoLogFile => println!("📁 No .nextflow.log was written"),
        LogUpload::NoExecutionName => println!("📁 Log upload skipped (execution name unknown)"),
    }
}
