//! ExpenseVista CLI Demo
//!
//! Signs in (restoring a remembered session when possible) and runs one
//! command against the API.
//!
//! Environment:
//! - `EXPENSEVISTA_API_URL`: API origin
//! - `EXPENSEVISTA_EMAIL`, `EXPENSEVISTA_PASSWORD`: credentials for a fresh sign-in
//!
//! Run with: cargo run -p expensevista-cli -- dashboard

mod output;

use anyhow::Context;
use expensevista_client::callbacks::ChannelSessionExpiryHandler;
use expensevista_client::{
    ClientConfig, ErrorClass, ExpenseClient, LoginRequest, PageRequest, ReportPeriod, StreamExt,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: expensevista-cli <dashboard|transactions|categories|report [period]|logout>";

fn parse_period(arg: Option<&str>) -> anyhow::Result<ReportPeriod> {
    match arg.unwrap_or("month") {
        "month" => Ok(ReportPeriod::ThisMonth),
        "3m" => Ok(ReportPeriod::LastThreeMonths),
        "6m" => Ok(ReportPeriod::LastSixMonths),
        "year" => Ok(ReportPeriod::ThisYear),
        other => anyhow::bail!("unknown period '{other}' (expected month, 3m, 6m or year)"),
    }
}

/// Resume the remembered session; any failure falls back to a fresh sign-in
async fn try_restore(client: &ExpenseClient) -> bool {
    match client.restore_session().await {
        Ok(restored) => restored,
        Err(e) => {
            tracing::warn!("Could not restore the previous session: {e}");
            false
        }
    }
}

/// Restore the remembered session or sign in from the environment
async fn sign_in(client: &ExpenseClient) -> anyhow::Result<()> {
    client.set_on_login_surface(true);
    let restored = try_restore(client).await;

    if !restored {
        let email = std::env::var("EXPENSEVISTA_EMAIL").context("EXPENSEVISTA_EMAIL is not set")?;
        let password =
            std::env::var("EXPENSEVISTA_PASSWORD").context("EXPENSEVISTA_PASSWORD is not set")?;
        client
            .login(&LoginRequest::new(email, password).remember(true))
            .await?;
    }
    client.set_on_login_surface(false);

    if let Some(user) = client.current_user() {
        output::display_signed_in(&user);
    }
    Ok(())
}

async fn run(client: &ExpenseClient, args: &[String]) -> anyhow::Result<()> {
    let command = args.first().map(String::as_str).unwrap_or("dashboard");

    match command {
        "dashboard" => {
            let dashboard = client.dashboard().get().await?;
            output::display_dashboard(&dashboard);
        }
        "transactions" => {
            let mut stream = Box::pin(client.transactions().stream(PageRequest::first(20)));
            while let Some(transaction) = stream.next().await {
                output::display_transaction(&transaction?);
            }
        }
        "categories" => {
            let categories = client.categories().list().await?;
            output::display_categories(&categories);
        }
        "report" => {
            let period = parse_period(args.get(1).map(String::as_str))?;
            let report = client.analytics().report(period).await?;
            output::display_report(&report);
        }
        "logout" => {
            client.logout().await?;
            println!("Signed out");
        }
        _ => anyhow::bail!(USAGE),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let client = ExpenseClient::new(ClientConfig::from_env()?)?;

    let (handler, mut expired) = ChannelSessionExpiryHandler::new();
    client.on_session_expired(handler);
    tokio::spawn(async move {
        while let Some(event) = expired.recv().await {
            tracing::info!(reason = %event.reason, "Session ended");
        }
    });

    sign_in(&client).await?;

    if let Err(e) = run(&client, &args).await {
        match e.downcast_ref::<expensevista_client::ClientError>() {
            Some(err) if err.class() == ErrorClass::SessionExpired => {
                output::display_error("Your session has expired. Please sign in again.");
            }
            Some(err) => output::display_error(&err.user_messages().join("\n")),
            None => output::display_error(&e.to_string()),
        }
        std::process::exit(1);
    }
    Ok(())
}
