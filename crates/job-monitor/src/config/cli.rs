use clap::{Parser, Subcommand};
use utils::version;

use crate::config::daemon::DaemonArgs;
use crate::config::job_types::JobTypeArgs;

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the job status monitor
    Daemon(Box<DaemonArgs>),
    /// Load the job type configuration, print it and exit
    #[command(name = "validate-config")]
    ValidateConfig(JobTypeArgs),
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn parses_daemon_with_inline_job_type() {
        let cli = Cli::try_parse_from([
            "job-monitor",
            "daemon",
            "--namespace",
            "jobs",
            "--job-type",
            "train",
            "--main-container",
            "main",
            "--redis-url",
            "redis://127.0.0.1:6379",
        ])
        .expect("arguments should parse");

        let Commands::Daemon(args) = cli.command else {
            panic!("expected daemon command");
        };
        assert_eq!(args.namespace, "jobs");
        assert_eq!(args.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(args.redis_key_prefix, "job_monitor");
        assert_eq!(args.publish_timeout_secs, 10);
        assert_eq!(args.job_types.job_type.as_deref(), Some("train"));
        assert_eq!(args.job_types.job_id_label, "job_id");
    }

    #[test]
    fn parses_validate_config() {
        let cli = Cli::try_parse_from([
            "job-monitor",
            "validate-config",
            "--job-types-file",
            "/etc/job-monitor/job-types.yaml",
        ])
        .expect("arguments should parse");

        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
