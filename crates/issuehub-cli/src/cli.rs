use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "issuehub",
    about = "Issuehub: GitHub issue, sub-issue and coding-agent assignment operations",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every command. These take precedence over the config
/// file and the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (TOML). Defaults to ./issuehub.toml when present
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// REST API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// GraphQL endpoint URL
    #[arg(long, global = true)]
    pub graphql_url: Option<String>,

    /// Environment variable holding the GitHub token
    #[arg(long, global = true)]
    pub token_env: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log debug events to stderr
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP tool server over stdio
    McpServe {
        /// Only expose tools that do not modify GitHub state
        #[arg(long)]
        read_only: bool,

        /// MCP server name
        #[arg(long, default_value = "issuehub-mcp")]
        server_name: String,

        /// MCP server version
        #[arg(long, default_value = "0.1.0")]
        server_version: String,
    },

    /// Manage a parent issue's sub-issues
    SubIssue {
        #[command(subcommand)]
        command: SubIssueCommands,
    },

    /// Assign the coding agent to an issue, keeping existing assignees
    AssignAgent {
        /// Repository as owner/repo
        repo: String,

        /// Issue number
        issue_number: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SubIssueCommands {
    /// Add a sub-issue to a parent issue
    Add {
        /// Repository as owner/repo
        repo: String,

        /// Parent issue number
        issue_number: i64,

        /// ID of the sub-issue (not its number)
        #[arg(long)]
        sub_issue_id: i64,

        /// Move the sub-issue away from its current parent
        #[arg(long)]
        replace_parent: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a parent issue's sub-issues in order
    List {
        /// Repository as owner/repo
        repo: String,

        /// Parent issue number
        issue_number: i64,

        /// Page number
        #[arg(long)]
        page: Option<i64>,

        /// Results per page (max 100)
        #[arg(long)]
        per_page: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a sub-issue from its parent
    Remove {
        /// Repository as owner/repo
        repo: String,

        /// Parent issue number
        issue_number: i64,

        /// ID of the sub-issue (not its number)
        #[arg(long)]
        sub_issue_id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a sub-issue next to a sibling
    Reprioritize {
        /// Repository as owner/repo
        repo: String,

        /// Parent issue number
        issue_number: i64,

        /// ID of the sub-issue to move
        #[arg(long)]
        sub_issue_id: i64,

        /// Place it after this sibling ID
        #[arg(long)]
        after_id: Option<i64>,

        /// Place it before this sibling ID
        #[arg(long)]
        before_id: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
