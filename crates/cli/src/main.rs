use anyhow::{Context, Result};
use atlas_maintenance::{
    regenerate_now, run_contract_check, run_weekly_maintenance, CheckStatus,
};
use atlas_vault::VaultConfig;
use chrono::Local;
use clap::{Parser, Subcommand};

mod server;

#[derive(Parser)]
#[command(name = "atlas")]
#[command(about = "Markdown vault engine: context bundles, search, maintenance", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the vault API over HTTP
    Serve {
        /// Port to listen on (overrides ATLAS_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Regenerate the now.md focus document from the masterplan
    Status,

    /// Check the vault against its structural contract
    #[command(name = "contract-check")]
    ContractCheck,

    /// Run the weekly maintenance checks and append the report
    Maintain,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config =
        VaultConfig::from_env().context("Set ATLAS_VAULT_ROOT to the repository root")?;

    match cli.command {
        Commands::Serve { port } => {
            let config = match port {
                Some(port) => config.with_port(port),
                None => config,
            };
            server::serve(config).await?;
        }
        Commands::Status => {
            regenerate_now(&config)?;
            println!("now.md regenerated");
        }
        Commands::ContractCheck => {
            let now = Local::now();
            let report = run_contract_check(
                &config,
                now.date_naive(),
                &now.format("%Y-%m-%d %H:%M").to_string(),
            )?;
            println!("Contract check: {}", report.status);
            for finding in &report.findings {
                println!("- {finding}");
            }
            if !report.suggested.is_empty() {
                println!("Suggested fixes:");
                for suggestion in &report.suggested {
                    println!("- {suggestion}");
                }
            }
            exit_on_fail(report.status);
        }
        Commands::Maintain => {
            let now = Local::now();
            let report = run_weekly_maintenance(
                &config,
                now.date_naive(),
                &now.format("%Y-%m-%d %H:%M").to_string(),
            )?;
            println!("Weekly maintenance: {}", report.status);
            for line in report
                .required
                .iter()
                .chain(&report.orphans)
                .chain(&report.stale)
                .chain(&report.drift)
            {
                println!("{line}");
            }
            exit_on_fail(report.status);
        }
    }

    Ok(())
}

fn exit_on_fail(status: CheckStatus) {
    if status == CheckStatus::Fail {
        std::process::exit(1);
    }
}
