//! Cipherpeak - a terminal client for the Cipherpeak business
//! administration backend.
//!
//! Thin front end over `cipherpeak-core`: log in, inspect the session, and
//! list or summarize backend records. All state lives on the backend; the
//! only things persisted locally are the session credential and a small
//! config file.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cipherpeak_core::api::ApiClient;
use cipherpeak_core::auth::SessionStore;
use cipherpeak_core::config::Config;
use cipherpeak_core::models::{LeaveStatus, LedgerSummary};

// ============================================================================
// Constants
// ============================================================================

/// How far around today the `events` command looks, in days
const EVENT_WINDOW_DAYS: i64 = 30;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    let config = Config::load()?;
    let session = Arc::new(SessionStore::load(Config::cache_dir()?));
    let api = ApiClient::new(config.resolved_base_url(), session)?;

    match command {
        "login" => login(&api, config).await,
        "logout" => {
            api.logout().await;
            println!("Logged out.");
            Ok(())
        }
        "whoami" => whoami(&api),
        "employees" => employees(&api).await,
        "clients" => clients(&api).await,
        "tasks" => tasks(&api).await,
        "events" => events(&api).await,
        "leaves" => leaves(&api, &args).await,
        "ledger" => ledger(&api).await,
        "summary" => summary(&api).await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    println!("Usage: cipherpeak <command>");
    println!();
    println!("Commands:");
    println!("  login       Log in to the backend");
    println!("  logout      Log out and clear the local session");
    println!("  whoami      Show the current session identity");
    println!("  employees   List employees");
    println!("  clients     List clients");
    println!("  tasks       List tasks");
    println!("  events      List calendar events around today");
    println!("  leaves      List leave applications");
    println!("              (admins: leaves approve <id> | leaves reject <id>)");
    println!("  ledger      Show the income/expense ledger (admin only)");
    println!("  summary     One-screen overview across all records");
}

// ============================================================================
// Commands
// ============================================================================

async fn login(api: &ApiClient, mut config: Config) -> Result<()> {
    let default_username = config.last_username.clone().unwrap_or_default();
    if default_username.is_empty() {
        print!("Username: ");
    } else {
        print!("Username [{}]: ", default_username);
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let mut username = username.trim().to_string();
    if username.is_empty() {
        username = default_username;
    }
    if username.is_empty() {
        anyhow::bail!("Username required");
    }

    let password = rpassword::prompt_password("Password: ")?;

    let subject = api
        .login(&username, &password)
        .await
        .context("Login failed")?;

    config.last_username = Some(username);
    config.save()?;

    info!(user = %subject.user, "login succeeded");
    println!("Logged in as {} ({})", subject.display_name(), subject.user);
    Ok(())
}

fn whoami(api: &ApiClient) -> Result<()> {
    match api.session().get() {
        Some(credential) => {
            let subject = credential.subject;
            println!("{} ({})", subject.display_name(), subject.user);
            if let Some(email) = subject.user_info.email {
                println!("{}", email);
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

async fn employees(api: &ApiClient) -> Result<()> {
    for employee in api.fetch_employees().await? {
        println!(
            "#{:<5} {:<28} {}",
            employee.id,
            employee.full_name(),
            employee.designation.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn clients(api: &ApiClient) -> Result<()> {
    for client in api.fetch_clients().await? {
        println!(
            "#{:<5} {:<36} {}",
            client.id,
            client.display_label(),
            client.email.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn tasks(api: &ApiClient) -> Result<()> {
    let today = Utc::now().date_naive();
    for task in api.fetch_tasks().await? {
        let due = task
            .due_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string());
        let overdue = if task.is_overdue(today) { " (overdue)" } else { "" };
        println!(
            "#{:<5} [{:<11}] {:<40} due {}{}",
            task.id,
            task.status.label(),
            task.title,
            due,
            overdue
        );
    }
    Ok(())
}

async fn events(api: &ApiClient) -> Result<()> {
    let today = Utc::now().date_naive();
    let events = api
        .fetch_events(
            today - Duration::days(EVENT_WINDOW_DAYS),
            today + Duration::days(EVENT_WINDOW_DAYS),
        )
        .await?;

    for event in events {
        println!(
            "{}  {}",
            event.start.format("%Y-%m-%d %H:%M"),
            event.title
        );
    }
    Ok(())
}

async fn leaves(api: &ApiClient, args: &[String]) -> Result<()> {
    match args.get(2).map(String::as_str) {
        Some(action @ ("approve" | "reject")) => {
            if !is_admin(api) {
                anyhow::bail!("Only admins can {} leave applications", action);
            }
            let id: i64 = args
                .get(3)
                .context("Leave id required")?
                .parse()
                .context("Invalid leave id")?;
            let status = if action == "approve" {
                LeaveStatus::Approved
            } else {
                LeaveStatus::Rejected
            };

            let leave = api.set_leave_status(id, status).await?;
            println!("Leave #{} is now {:?}", leave.id, leave.status);
        }
        _ => {
            for leave in api.fetch_leaves().await? {
                println!(
                    "#{:<5} {} -> {} ({} days) {:<10} {}",
                    leave.id,
                    leave.start_date,
                    leave.end_date,
                    leave.days(),
                    format!("{:?}", leave.status),
                    leave.reason
                );
            }
        }
    }
    Ok(())
}

async fn ledger(api: &ApiClient) -> Result<()> {
    if !is_admin(api) {
        anyhow::bail!("The ledger is admin-only");
    }

    let entries = api.fetch_ledger().await?;
    for entry in &entries {
        println!(
            "{}  {:>10.2}  {:<16} {}",
            entry.date,
            entry.signed_amount(),
            entry.category,
            entry.note.as_deref().unwrap_or("")
        );
    }

    let totals = LedgerSummary::of(&entries);
    println!();
    println!(
        "income {:.2}  expense {:.2}  net {:.2}",
        totals.income,
        totals.expense,
        totals.net()
    );
    Ok(())
}

/// One-screen overview. Fires all list fetches concurrently; if the access
/// token has expired, the whole burst shares a single refresh.
async fn summary(api: &ApiClient) -> Result<()> {
    let today = Utc::now().date_naive();
    let (employees, clients, tasks, events, leaves) = futures::try_join!(
        api.fetch_employees(),
        api.fetch_clients(),
        api.fetch_tasks(),
        api.fetch_events(
            today - Duration::days(EVENT_WINDOW_DAYS),
            today + Duration::days(EVENT_WINDOW_DAYS),
        ),
        api.fetch_leaves(),
    )?;

    println!("{} employees, {} clients", employees.len(), clients.len());

    let open = tasks.iter().filter(|task| task.is_open()).count();
    let overdue = tasks.iter().filter(|task| task.is_overdue(today)).count();
    println!("{} open tasks ({} overdue)", open, overdue);

    println!(
        "{} events within {} days",
        events.len(),
        EVENT_WINDOW_DAYS
    );

    let pending = leaves.iter().filter(|leave| leave.is_pending()).count();
    println!("{} leave applications pending", pending);
    Ok(())
}

fn is_admin(api: &ApiClient) -> bool {
    api.session()
        .get()
        .map(|credential| credential.subject.is_admin())
        .unwrap_or(false)
}
