mod cli;
mod commands;
mod navigator;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use podline_app::config::loader;
use podline_app::{PodApp, observability};
use podline_auth::FileSessionStorage;
use url::Url;

use cli::{Cli, Commands, ConfigCommands};
use navigator::TerminalNavigator;
use output::{TerminalLog, print_error};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(if cli.verbose { "debug" } else { "warn" });

    let config = loader::load_config(cli.config.as_deref()).map_err(|e| anyhow!(e))?;
    if !cli.verbose {
        observability::apply_logging_level(&config.logging.level);
    }

    if let Commands::Config(args) = &cli.command {
        match args.command {
            ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), cli.profile);
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        return Ok(());
    }

    // The "page" this run is looking at: the redirect URL after a login, the
    // configured return URL otherwise.
    let start_url = match &cli.command {
        Commands::Callback(args) => {
            Url::parse(&args.url).with_context(|| format!("Invalid callback URL: {}", args.url))?
        }
        _ => Url::parse(&config.identity.redirect_url)?,
    };
    let storage = Arc::new(FileSessionStorage::in_home(&cli.profile)?);
    let app = PodApp::connect(
        config,
        storage,
        Arc::new(TerminalNavigator::new(start_url)),
        Arc::new(TerminalLog),
    )?;
    let session = app.start().await?;

    match &cli.command {
        Commands::Login(args) => {
            commands::auth::login(&app, &session, args.issuer.as_deref()).await?;
        }
        Commands::Callback(_) => {
            commands::auth::callback(&session)?;
        }
        Commands::Logout => {
            commands::auth::logout(&app, &session, &cli.profile).await?;
        }
        Commands::Whoami => {
            commands::auth::whoami(&app, &session, &cli.profile).await?;
        }
        Commands::Create(args) => {
            commands::documents::create(&app, &session, args.url.as_deref()).await?;
        }
        Commands::Fetch(args) => {
            commands::documents::fetch(&app, &session, args.url.as_deref()).await?;
        }
        Commands::Ls(args) => {
            commands::documents::ls(&app, &session, args.container.as_deref()).await?;
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
