use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rworklog
/// Work-hour ledger: projects, work logs, monthly invoices (SQLite + HTTP API)
#[derive(Parser)]
#[command(
    name = "rworklog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Work-hour ledger: log project hours, preview, close and export monthly invoices",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check the configuration for settings that block `serve`")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Run the HTTP API server
    Serve {
        #[arg(long = "bind", value_name = "ADDR", help = "Listen address (overrides bind_address)")]
        bind: Option<String>,
    },

    /// Manage users and issue bearer tokens
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Create or list projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Record or list work logs
    Worklog {
        #[command(subcommand)]
        action: WorklogAction,
    },

    /// Show the invoice preview of a month
    Preview {
        #[arg(long, value_name = "YYYY-MM")]
        month: String,
    },

    /// Close (lock) a month; requires an admin user
    Close {
        #[arg(long, value_name = "YYYY-MM")]
        month: String,

        #[arg(long = "as", value_name = "USERNAME", help = "Admin user performing the close")]
        as_user: String,
    },

    /// Export the invoice of a month
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, value_name = "YYYY-MM")]
        month: String,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user
    Add {
        username: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, help = "Grant administrator privileges")]
        admin: bool,
    },

    /// List users
    List,

    /// Issue a bearer token for an active user
    Token { username: String },

    /// Disable a user; existing tokens stay valid until they expire
    Disable { username: String },

    /// Re-enable a disabled user
    Enable { username: String },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Add a project
    Add {
        management_no: String,

        #[arg(long = "machine-no")]
        machine_no: Option<String>,

        #[arg(long = "estimated", value_name = "MINUTES")]
        estimated: Option<i64>,

        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },

    /// List active projects
    List {
        #[arg(long = "all", help = "Include deactivated projects")]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum WorklogAction {
    /// Record work on a project
    Add {
        /// Management number of the project
        #[arg(long)]
        project: String,

        /// Work date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        #[arg(long = "minutes")]
        minutes: i64,

        #[arg(long = "in", help = "Start time (HH:MM)")]
        start: Option<String>,

        #[arg(long = "out", help = "End time (HH:MM)")]
        end: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },

    /// List the work logs of a month
    List {
        #[arg(long, value_name = "YYYY-MM")]
        month: String,
    },
}
