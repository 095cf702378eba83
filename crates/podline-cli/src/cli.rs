use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "podline")]
#[command(about = "podline - log into a Solid pod and round-trip a small record")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./podline.toml when present)
    #[arg(short, long, global = true, env = "PODLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Session profile name
    #[arg(short, long, global = true, env = "PODLINE_PROFILE", default_value = "default")]
    pub profile: String,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a login with an identity provider
    Login(LoginArgs),
    /// Complete a login with the URL the provider sent you back to
    Callback(CallbackArgs),
    /// Logout (remove the stored session)
    Logout,
    /// Show the logged-in user and their profile
    Whoami,
    /// Write a fresh record to the demo document
    Create(DocumentArgs),
    /// Read the records in the demo document
    Fetch(DocumentArgs),
    /// List the contents of a container
    Ls(LsArgs),
    /// Show CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Identity provider (defaults to identity.issuer from the config)
    pub issuer: Option<String>,
}

#[derive(clap::Args)]
pub struct CallbackArgs {
    /// Full redirect URL, including code and state
    pub url: String,
}

#[derive(clap::Args)]
pub struct DocumentArgs {
    /// Document URL (defaults to the demo document under your storage root)
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(clap::Args)]
pub struct LsArgs {
    /// Container URL (defaults to your storage root)
    pub container: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective config
    Show,
}
