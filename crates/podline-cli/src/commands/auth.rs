use anyhow::Result;
use colored::Colorize;
use podline_app::PodApp;
use podline_auth::Session;

use crate::output::{print_error, print_success};

pub async fn login(app: &PodApp, session: &Session, issuer: Option<&str>) -> Result<()> {
    if let Some(web_id) = session.subject_id().filter(|_| session.is_logged_in()) {
        print_success(&format!("Already logged in as {}", web_id.cyan()));
        return Ok(());
    }
    app.login(issuer).await?;
    Ok(())
}

/// The session was completed by `PodApp::start`; only the outcome is left to report.
pub fn callback(session: &Session) -> Result<()> {
    match session.subject_id().filter(|_| session.is_logged_in()) {
        Some(web_id) => print_success(&format!("Logged in as {}", web_id.cyan())),
        None if session.is_logged_in() => print_success("Logged in (no WebID in the ID token)"),
        None => anyhow::bail!("Login did not complete"),
    }
    Ok(())
}

pub async fn logout(app: &PodApp, session: &Session, profile: &str) -> Result<()> {
    if !session.is_logged_in() {
        println!("No session found for profile \"{profile}\"");
        return Ok(());
    }
    app.logout().await?;
    print_success("Logged out (session removed)");
    Ok(())
}

pub async fn whoami(app: &PodApp, session: &Session, profile: &str) -> Result<()> {
    let Some(web_id) = session.subject_id().filter(|_| session.is_logged_in()) else {
        print_error(&format!("Not logged in (profile: \"{profile}\")"));
        return Ok(());
    };

    let profile_doc = app.profiles().resolve(session).await?;
    println!("{}: {}", "WebID".cyan(), web_id);
    if let Some(issuer) = &session.info().issuer {
        println!("{}: {}", "Issuer".cyan(), issuer);
    }
    if let Some(expires_at) = session.info().expires_at {
        println!("{}: {}", "Expires".cyan(), expires_at);
    }
    println!(
        "{}: {}",
        "Name".cyan(),
        profile_doc.display_name.as_deref().unwrap_or("(not set)")
    );
    println!(
        "{}: {}",
        "Storage".cyan(),
        profile_doc
            .storage_location
            .as_ref()
            .map_or("(not set)", |u| u.as_str())
    );
    Ok(())
}
