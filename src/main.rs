use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use qscale::cli::{self, check::CheckArgs, fix::FixArgs, rules::RulesArgs, GlobalArgs};
use qscale::Result;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qscale")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Home Assistant Integration Quality Scale checker", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate quality scale reports for an integration
    Check(CheckArgs),

    /// Generate a patch from an existing rule report
    Fix(FixArgs),

    /// List quality scale rules per tier
    Rules(RulesArgs),

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "warn,qscale=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check(args) => {
            let config = cli::load_config(&cli.global, args.core_path.as_deref())?;
            cli::check::run(&args, &config).await?;
        }

        Commands::Fix(args) => {
            let config = cli::load_config(&cli.global, args.core_path.as_deref())?;
            cli::fix::run(&args, &config).await?;
        }

        Commands::Rules(args) => {
            let config = cli::load_config(&cli.global, args.core_path.as_deref())?;
            cli::rules::run(&args, &config).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut io::stdout());
        }
    }

    Ok(())
}
