//! Clap derive structures for the `fuelsync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use fuelsync_core::{PaymentMethod, StationStatus, UserRole, UserStatus, WashStatus};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fuelsync -- console for fuel stations, staff and washing-bay records
#[derive(Debug, Parser)]
#[command(
    name = "fuelsync",
    version,
    about = "Manage fuel stations, staff and washing-bay records from the command line",
    long_about = "Talks to the fuel retail management backend.\n\n\
        When the backend's health probe fails, reads are served from built-in\n\
        offline datasets and mutations are applied locally (see offline_policy).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "FUELSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "FUELSYNC_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token (overrides profile and keyring)
    #[arg(long, env = "FUELSYNC_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Never contact the backend; use the offline datasets
    #[arg(long, env = "FUELSYNC_OFFLINE", global = true)]
    pub offline: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FUELSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "FUELSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-attempt request timeout in seconds (overrides profile)
    #[arg(long, env = "FUELSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the backend health endpoint
    Health,

    /// Manage fuel stations
    #[command(alias = "st")]
    Stations(StationsArgs),

    /// Manage staff accounts
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Manage washing-bay entries
    #[command(alias = "wb")]
    WashingBay(WashingBayArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StationsArgs {
    #[command(subcommand)]
    pub command: StationsCommand,
}

/// Station list filters. `ALL` (any case) clears a filter.
#[derive(Debug, Args)]
pub struct StationFilterArgs {
    /// Status: ACTIVE, INACTIVE or MAINTENANCE
    #[arg(long)]
    pub status: Option<String>,

    /// Region name
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Search name, code and location
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Print statistics instead of the list
    #[arg(long)]
    pub stats: bool,
}

#[derive(Debug, Subcommand)]
pub enum StationsCommand {
    /// List stations
    #[command(alias = "ls")]
    List(StationFilterArgs),

    /// Show one station
    Get {
        /// Station id
        id: String,
    },

    /// Register a new station
    Create {
        /// Station code, e.g. AS-004
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        region: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long, default_value = "ACTIVE")]
        status: StationStatus,

        #[arg(long, default_value = "0")]
        pumps: u32,

        /// Fuel types, comma-separated
        #[arg(long, value_delimiter = ',')]
        fuel: Vec<String>,
    },

    /// Update station details
    Update {
        /// Station id
        id: String,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        region: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        pumps: Option<u32>,

        /// Fuel types, comma-separated
        #[arg(long, value_delimiter = ',')]
        fuel: Option<Vec<String>>,
    },

    /// Delete a station
    #[command(alias = "rm")]
    Delete {
        /// Station id
        id: String,
    },

    /// Change a station's operating status
    Status {
        /// Station id
        id: String,

        /// ACTIVE, INACTIVE or MAINTENANCE
        status: StationStatus,
    },

    /// Assign a manager to a station
    Assign {
        /// Station id
        id: String,

        /// Manager's user id
        #[arg(long)]
        user: String,

        /// Manager's display name
        #[arg(long)]
        name: String,
    },

    /// Remove a station's manager
    Unassign {
        /// Station id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

/// User list filters. `ALL` (any case) clears a filter.
#[derive(Debug, Args)]
pub struct UserFilterArgs {
    /// Role: ADMIN, MANAGER, ATTENDANT or ACCOUNTANT
    #[arg(long)]
    pub role: Option<String>,

    /// Status: ACTIVE, INACTIVE or SUSPENDED
    #[arg(long)]
    pub status: Option<String>,

    /// Station id or name
    #[arg(long)]
    pub station: Option<String>,

    /// Search name, email and phone
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Print statistics instead of the list
    #[arg(long)]
    pub stats: bool,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List(UserFilterArgs),

    /// Show one user
    Get {
        /// User id
        id: String,
    },

    /// Create a user account
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long)]
        role: UserRole,

        #[arg(long, default_value = "ACTIVE")]
        status: UserStatus,
    },

    /// Update account details
    Update {
        /// User id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        role: Option<UserRole>,
    },

    /// Delete a user account
    #[command(alias = "rm")]
    Delete {
        /// User id
        id: String,
    },

    /// Change an account's status
    Status {
        /// User id
        id: String,

        /// ACTIVE, INACTIVE or SUSPENDED
        status: UserStatus,
    },

    /// Attach a user to a station
    Assign {
        /// User id
        id: String,

        /// Station id
        #[arg(long)]
        station: String,

        /// Station display name
        #[arg(long)]
        name: String,
    },

    /// Detach a user from their station
    Unassign {
        /// User id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WASHING BAY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WashingBayArgs {
    #[command(subcommand)]
    pub command: WashingBayCommand,
}

/// Washing-bay list filters. `ALL` (any case) clears a filter.
#[derive(Debug, Args)]
pub struct WashingBayFilterArgs {
    /// Station id or name
    #[arg(long)]
    pub station: Option<String>,

    /// Service type
    #[arg(long)]
    pub service: Option<String>,

    /// Payment: CASH, MOBILE_MONEY or CARD
    #[arg(long)]
    pub payment: Option<String>,

    /// Status: PENDING, COMPLETED or CANCELLED
    #[arg(long)]
    pub status: Option<String>,

    /// Search plate, attendant and vehicle type
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Print statistics instead of the list
    #[arg(long)]
    pub stats: bool,
}

#[derive(Debug, Subcommand)]
pub enum WashingBayCommand {
    /// List washing-bay entries
    #[command(alias = "ls")]
    List(WashingBayFilterArgs),

    /// Show one entry
    Get {
        /// Entry id
        id: String,
    },

    /// Record a wash
    Create {
        /// Station id
        #[arg(long)]
        station: String,

        /// Station display name
        #[arg(long, default_value = "")]
        station_name: String,

        #[arg(long)]
        plate: String,

        #[arg(long, default_value = "")]
        vehicle: String,

        #[arg(long, default_value = "")]
        service: String,

        #[arg(long)]
        amount: f64,

        #[arg(long, default_value = "CASH")]
        payment: PaymentMethod,

        #[arg(long, default_value = "PENDING")]
        status: WashStatus,

        #[arg(long, default_value = "")]
        attendant: String,
    },

    /// Correct an entry
    Update {
        /// Entry id
        id: String,

        #[arg(long)]
        plate: Option<String>,

        #[arg(long)]
        vehicle: Option<String>,

        #[arg(long)]
        service: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        payment: Option<PaymentMethod>,

        #[arg(long)]
        attendant: Option<String>,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry id
        id: String,
    },

    /// Mark an entry pending, completed or cancelled
    Status {
        /// Entry id
        id: String,

        /// PENDING, COMPLETED or CANCELLED
        status: WashStatus,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display the current configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
