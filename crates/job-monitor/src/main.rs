use anyhow::Result;
use clap::Parser;
use job_monitor::app::ApplicationBuilder;
use job_monitor::config::Cli;
use job_monitor::config::Commands;
use job_monitor::config::DaemonArgs;
use job_monitor::config::JobTypeArgs;
use utils::logging;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon(daemon_args) => run_daemon(*daemon_args).await,
        Commands::ValidateConfig(job_type_args) => run_validate_config(job_type_args),
    }
}

async fn run_daemon(daemon_args: DaemonArgs) -> Result<()> {
    let _guard = logging::init(daemon_args.log_file.as_deref())?;

    tracing::info!("Starting job status monitor {}", &**version::VERSION);

    let mut app = ApplicationBuilder::new(daemon_args).build().await?;
    app.run().await
}

fn run_validate_config(job_type_args: JobTypeArgs) -> Result<()> {
    let job_types = job_type_args.load()?;
    for job_type in &job_types {
        println!(
            "{}: main container `{}`, job id label `{}`, selector `{}`",
            job_type.job_type,
            job_type.main_container,
            job_type.job_id_label,
            job_type.effective_label_selector()
        );
    }
    Ok(())
}
