use crate::core::params::ParameterSet;
use crate::utils::error::{LaunchError, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pangenome-launch")]
#[command(about = "Launcher for the nf-core/pangenome Nextflow pipeline")]
#[command(version)]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the parameter schema as JSON
    Schema,

    /// Provision the shared storage volume and print its name
    Initialize,

    /// Stage the work dir, run the pipeline and upload its log
    Run {
        /// Volume claim returned by `initialize`
        #[arg(long)]
        pvc: String,

        #[command(flatten)]
        params: ParamArgs,

        /// Sample pipeline CPU and memory while it runs
        #[arg(long)]
        monitor: bool,
    },

    /// Initialize followed by run
    Launch {
        #[command(flatten)]
        params: ParamArgs,

        #[arg(long)]
        monitor: bool,
    },

    /// Dry run - print the command line and environment without executing
    Plan {
        #[arg(long, default_value = "<pvc>")]
        pvc: String,

        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ParamArgs {
    /// Pipeline parameter, repeatable
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// JSON object of pipeline parameters
    #[arg(long)]
    pub params_file: Option<PathBuf>,
}

impl ParamArgs {
    /// Layers `--params-file` and then `--param` over `set`.
    pub fn apply(&self, set: &mut ParameterSet) -> Result<()> {
        if let Some(path) = &self.params_file {
            let content = std::fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&content)?;
            let object = value
                .as_object()
                .ok_or_else(|| LaunchError::InvalidConfigValueError {
                    field: "--params-file".to_string(),
                    value: path.display().to_string(),
                    reason: "expected a JSON object".to_string(),
                })?;
            set.extend_json(object)?;
        }

        for assignment in &self.params {
            set.set_assignment(assignment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ParamValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::parse_from([
            "pangenome-launch",
            "run",
            "--pvc",
            "pvc-1",
            "-p",
            "n_haplotypes=4",
            "--param",
            "communities=true",
            "--monitor",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                pvc,
                params,
                monitor,
            } => {
                assert_eq!(pvc, "pvc-1");
                assert_eq!(params.params, vec!["n_haplotypes=4", "communities=true"]);
                assert!(monitor);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_params_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"wfmash_chunks": 2, "email": "a@b.org"}"#)
            .unwrap();

        let args = ParamArgs {
            params: vec!["wfmash_chunks=8".to_string()],
            params_file: Some(file.path().to_path_buf()),
        };
        let mut set = ParameterSet::new();
        args.apply(&mut set).unwrap();

        assert_eq!(set.get("wfmash_chunks"), Some(&ParamValue::Int(8)));
        assert_eq!(set.get("email"), Some(&ParamValue::str("a@b.org")));
    }

    #[test]
    fn test_params_file_must_be_object() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2]").unwrap();

        let args = ParamArgs {
            params: vec![],
            params_file: Some(file.path().to_path_buf()),
        };
        assert!(args.apply(&mut ParameterSet::new()).is_err());
    }
}
