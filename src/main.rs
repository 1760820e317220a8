mod commands;

use clap::Parser;
use colored::*;
use std::process;

use journal_client::cli::Args;
use journal_client::config::Config;
use journal_client::error::JournalError;
use journal_client::ui::display_error;

#[tokio::main]
async fn main() {
    let mut args = Args::parse();

    let command = match args.command.take() {
        Some(command) => command,
        None => {
            print_usage();
            process::exit(1);
        }
    };

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            display_error(&e);
            process::exit(1);
        }
    };

    if config.verbose {
        eprintln!("{}", format!("[journal] API: {}", config.api_url).dimmed());
    }

    if let Err(e) = commands::run(command, &config).await {
        display_error(&e.to_string());
        if matches!(e, JournalError::Unauthorized) {
            eprintln!("{}", "Run `journal login <email>` to sign in.".dimmed());
        }
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("{}", "Usage: journal [OPTIONS] <COMMAND>".red());
    eprintln!("{}", "  login <email>         Log in".dimmed());
    eprintln!("{}", "  chat [message]        Chat with the assistant".dimmed());
    eprintln!("{}", "  entries write         Write today's entry".dimmed());
    eprintln!("{}", "  goals list            Show your goals".dimmed());
    eprintln!("{}", "  insights week         This week's insight".dimmed());
    eprintln!("{}", "  push subscribe        Enable notifications".dimmed());
    eprintln!("{}", "Run `journal --help` for all commands.".dimmed());
}
