//! Issuehub CLI: the `issuehub` command.

mod cli;
mod commands;
mod config;
mod logging;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    match cli.command {
        Commands::McpServe {
            read_only,
            server_name,
            server_version,
        } => commands::mcp_serve::run(
            &cli.global,
            commands::mcp_serve::Args {
                read_only,
                server_name,
                server_version,
            },
        ),

        Commands::SubIssue { command } => commands::sub_issue::run(&cli.global, command),

        Commands::AssignAgent {
            repo,
            issue_number,
            json,
        } => commands::assign::run(&cli.global, repo, issue_number, json),
    }
}
