use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "shroud")]
#[command(version = BUILD_VERSION)]
#[command(about = "Shroud - Single-use action proofs backed by a nullifier ledger")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE", help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(short = 'd', long, global = true, value_name = "DIR", env = "SHROUD_DATA_DIR", help = "Data directory path")]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Write logs to file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text", help = "Output format")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize the data directory")]
    #[command(long_about = "Create the data directory, write default configuration and open the ledger.\n\nThe proof key is generated on first open and kept in the local store.")]
    Init {
        #[arg(short, long, help = "Overwrite existing configuration")]
        force: bool,
    },

    #[command(about = "Manage identity commitments")]
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },

    #[command(about = "Issue and verify single-use action proofs")]
    Proof {
        #[command(subcommand)]
        action: ProofAction,
    },

    #[command(about = "Seal content with AES-256-GCM")]
    Encrypt {
        #[arg(long, value_name = "HEX", help = "256-bit key as hex (generated when omitted)")]
        key: Option<String>,
        #[arg(help = "Plaintext (read from stdin when omitted)")]
        input: Option<String>,
    },

    #[command(about = "Open sealed content")]
    Decrypt {
        #[arg(help = "Sealed JSON file (read from stdin when omitted)")]
        input: Option<PathBuf>,
    },

    #[command(about = "Show statistics")]
    Stats,

    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show effective configuration")]
    Show,
    #[command(about = "Print config file path")]
    Path,
}

#[derive(Subcommand)]
pub enum IdentityAction {
    #[command(about = "Issue a new identity commitment")]
    Issue {
        #[arg(long, help = "Group the identity belongs to")]
        group: String,
        #[arg(long, short, help = "Write the identity bundle to this file")]
        output: Option<PathBuf>,
    },
    #[command(about = "Show the registry record for a commitment")]
    Show {
        #[arg(help = "Commitment (64 hex characters)")]
        commitment: String,
    },
    #[command(about = "Revoke an identity")]
    Revoke {
        #[arg(help = "Commitment (64 hex characters)")]
        commitment: String,
    },
}

#[derive(Subcommand)]
pub enum ProofAction {
    #[command(about = "Issue a proof for an (action, topic) slot")]
    Issue {
        #[arg(long, help = "Identity bundle file")]
        bundle: PathBuf,
        #[arg(long, help = "Action label (e.g. upvote)")]
        action: String,
        #[arg(long, help = "Topic the action applies to")]
        topic: String,
        #[arg(long, short, help = "Write the proof artifact to this file")]
        output: Option<PathBuf>,
    },
    #[command(about = "Verify a proof artifact")]
    Verify {
        #[arg(long, help = "Proof artifact file")]
        proof: PathBuf,
        #[arg(long, help = "Expected action label")]
        action: String,
        #[arg(long, help = "Expected topic")]
        topic: String,
    },
}
