mod commands;
mod config_cmd;
mod crypto;
mod identity;
mod init;
mod proof;
mod stats;
mod utils;

pub use commands::{Cli, Commands};
pub use config_cmd::handle_config;
pub use crypto::{decrypt_content, encrypt_content};
pub use identity::handle_identity;
pub use init::init_store;
pub use proof::handle_proof;
pub use stats::show_stats;
pub use utils::init_logging;
