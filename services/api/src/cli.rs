use crate::commands::{run_classify, run_import, run_rut, ClassifyArgs, ImportArgs, RutCommand};
use crate::server;
use border_crossing::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Border Crossing Control",
    about = "Run the vehicle-control service or check RUTs and risk tiers from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate or format a Chilean RUT
    Rut {
        #[command(subcommand)]
        command: RutCommand,
    },
    /// Risk classification helpers
    Risk {
        #[command(subcommand)]
        command: RiskCommand,
    },
    /// Batch operations on crossing requests
    Crossings {
        #[command(subcommand)]
        command: CrossingsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RiskCommand {
    /// Classify a single request from its declared fields
    Classify(ClassifyArgs),
}

#[derive(Subcommand, Debug)]
enum CrossingsCommand {
    /// Classify a CSV batch of requests and print the review queue
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rut { command } => run_rut(command),
        Command::Risk {
            command: RiskCommand::Classify(args),
        } => run_classify(args),
        Command::Crossings {
            command: CrossingsCommand::Import(args),
        } => run_import(args),
    }
}
