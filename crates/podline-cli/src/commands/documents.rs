use anyhow::{Context, Result};
use colored::Colorize;
use podline_app::{DeleteOutcome, PodApp};
use podline_auth::Session;
use url::Url;

use crate::output::{print_records, print_success};

async fn document_url(app: &PodApp, session: &Session, explicit: Option<&str>) -> Result<Url> {
    if let Some(raw) = explicit {
        return Url::parse(raw).with_context(|| format!("Invalid document URL: {raw}"));
    }
    let target = app
        .document_target(session)
        .await
        .context("Failed to locate the demo document")?;
    if target.fallback {
        println!(
            "{} profile names no storage, using {}",
            "!".yellow(),
            target.url
        );
    }
    Ok(target.url)
}

pub async fn create(app: &PodApp, session: &Session, url: Option<&str>) -> Result<()> {
    let url = document_url(app, session, url).await?;
    app.log().info(&format!("Creating: {url}"));

    let report = app.documents().create_and_store(session, &url).await?;
    if let DeleteOutcome::Deleted = report.delete {
        tracing::debug!(%url, "replaced previous document");
    }
    app.log().info("done create one");
    print_success(&format!(
        "Stored record {} in {}",
        report.record.identifier.cyan(),
        url
    ));
    Ok(())
}

pub async fn fetch(app: &PodApp, session: &Session, url: Option<&str>) -> Result<()> {
    let url = document_url(app, session, url).await?;
    app.log().info(&format!("attempting to get: {url}"));

    let records = app.documents().fetch_and_list(session, &url).await;
    print_records(&records);
    Ok(())
}

pub async fn ls(app: &PodApp, session: &Session, container: Option<&str>) -> Result<()> {
    let container = match container {
        Some(raw) => Url::parse(raw).with_context(|| format!("Invalid container URL: {raw}"))?,
        None => {
            let target = app.document_target(session).await?;
            target
                .url
                .join("./")
                .context("Document URL has no parent container")?
        }
    };

    let members = app.documents().list_container(session, &container).await?;
    app.log().info(&format!("done getting, got urls: {}", members.len()));
    if members.is_empty() {
        println!("{container} is empty.");
    }
    for member in members {
        println!("{member}");
    }
    Ok(())
}
