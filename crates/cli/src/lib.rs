pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "freightwatch",
    about = "Freightwatch operator CLI",
    long_about = "Operate Freightwatch readiness, migrations, demo data, and one-shot queries.",
    after_help = "Examples:\n  freightwatch doctor --json\n  freightwatch seed\n  freightwatch ask \"What is the status of SHIP-REF-1003?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Send one question to a running freightwatch server and print the answer")]
    Ask {
        question: String,
        #[arg(long, help = "Invocation endpoint (defaults to the configured server address)")]
        url: Option<String>,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Apply migrations and load the demo shipment dataset")]
    Seed,
    #[command(about = "Validate config, LLM endpoint settings, and DB connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { question, url } => commands::ask::run(&question, url.as_deref()),
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
