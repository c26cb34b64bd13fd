//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands;
use donormatch::config::Settings;
use donormatch::output::OutputMode;

/// donormatch - match donation requests with donor offers
#[derive(Parser, Debug)]
#[command(
    name = "donormatch",
    version,
    about = "Match donation requests with donor offers",
    long_about = "Track blood, organ and tissue donation requests and offers.\n\n\
                  Requests are matched against available donations by medical\n\
                  compatibility, urgency, offer freshness and distance."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Act as this configured user
    #[arg(long = "as", global = true, value_name = "USER")]
    pub as_user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve {
        /// Socket address, overriding `[server] bind`
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Manage your donation requests
    Request {
        #[command(subcommand)]
        action: RequestAction,
    },

    /// Manage your donation offers
    Donation {
        #[command(subcommand)]
        action: DonationAction,
    },

    /// Find, create and complete matches
    Match {
        #[command(subcommand)]
        action: MatchAction,
    },

    /// Show version
    Version,
}

/// Fields shared by requests and offers
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceArgs {
    /// Kind: blood, organ, tissue
    #[arg(short = 't', long = "type")]
    pub kind: String,

    /// Blood type (A+, O-, ...), for blood
    #[arg(long)]
    pub blood_type: Option<String>,

    /// Organ or tissue type (kidney, cornea, bone-marrow, ...)
    #[arg(long)]
    pub organ_type: Option<String>,

    /// Quantity
    #[arg(short, long)]
    pub quantity: Option<i64>,

    /// Unit: units, ml, pints, bags
    #[arg(long)]
    pub unit: Option<String>,

    /// Urgency: low, normal, high, critical
    #[arg(short, long)]
    pub urgency: Option<String>,

    /// Location label (defaults to your profile)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Location latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Location longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum RequestAction {
    /// Create a request
    Create {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Medical justification
        #[arg(short = 'm', long = "justification")]
        justification: String,

        /// Special requirements
        #[arg(long)]
        requirements: Option<String>,

        /// Needed-by date (YYYY-MM-DD)
        #[arg(long)]
        required_by: Option<String>,
    },

    /// List your requests
    List,

    /// Cancel one of your active requests
    Cancel {
        /// Request id
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum DonationAction {
    /// Offer a donation
    Add {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Last date the offer stands (YYYY-MM-DD)
        #[arg(long)]
        available_until: Option<String>,

        /// Contact phone (defaults to your profile)
        #[arg(long)]
        phone: Option<String>,
    },

    /// List your offers
    List,
}

#[derive(Subcommand, Debug)]
pub enum MatchAction {
    /// Rank candidate donations for a request
    Find {
        /// Request id
        request_id: u64,
    },

    /// Commit a candidate
    Create {
        /// Donation id
        #[arg(short, long)]
        donation: u64,

        /// Request id
        #[arg(short, long)]
        request: u64,

        /// Score shown with the candidate
        #[arg(short, long)]
        score: i64,

        /// Distance shown with the candidate, in km
        #[arg(long)]
        distance: f64,
    },

    /// Mark a match as handed over
    Complete {
        /// Match id
        id: u64,
    },

    /// List matches involving your requests or offers
    List,
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let Some(command) = cli.command else {
        if output_mode == OutputMode::Json {
            println!(
                "{}",
                serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "hint": "Use --help for usage"
                })
            );
        } else {
            println!("donormatch v{}", env!("CARGO_PKG_VERSION"));
            println!("\nRun 'donormatch --help' for usage");
        }
        return Ok(());
    };

    if let Command::Version = command {
        if output_mode == OutputMode::Json {
            println!("{}", serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }));
        } else {
            println!("donormatch v{}", env!("CARGO_PKG_VERSION"));
        }
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let session = commands::Session::open(&settings, cli.as_user, output_mode)?;

    match command {
        Command::Serve { bind } => commands::serve(&session, &settings, bind.as_deref()),
        Command::Request { action } => commands::request(&session, action),
        Command::Donation { action } => commands::donation(&session, action),
        Command::Match { action } => commands::matching(&session, action),
        Command::Version => Ok(()),
    }
}
