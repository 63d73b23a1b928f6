use std::{collections::HashMap, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    view::{Console, ViewState},
    ClientConfig, LedgerClient, RequestEncoding, DEFAULT_SERVER_URL,
};
use serde::Serialize;
use shared::command::{from_fields, Command, PrepareDelivery};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

use render::render_region;

#[derive(Parser, Debug)]
#[command(about = "Exam ledger console")]
struct Args {
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    /// Send commands as one `-`-joined path segment instead of query parameters.
    #[arg(long)]
    legacy_paths: bool,
    /// Give up on a request after this many seconds. Waits indefinitely when unset.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List groups, sorted by name.
    Groups,
    /// List students, sorted by group.
    Users,
    /// groupName=.. description=..
    AddGroup { fields: Vec<String> },
    /// studentId=.. studentName=.. groupName=.. description=..
    AddUser { fields: Vec<String> },
    /// groupName=.. courseName=.. teacherName=..
    GenerateSet { fields: Vec<String> },
    UserRecord { id: String },
    /// group=.. course=..
    PrepareDelivery { fields: Vec<String> },
    /// Lists the group's items for a course, selects one by key and rates it.
    Deliver {
        #[arg(long)]
        group: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        item: String,
        #[arg(long)]
        rate: String,
    },
}

/// Splits `name=value` arguments into a field map. Later duplicates win.
fn parse_fields(raw: &[String]) -> Result<HashMap<String, String>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| anyhow!("expected name=value, got {pair:?}"))
        })
        .collect()
}

fn command<C: Command>(raw: &[String]) -> Result<C> {
    let fields = parse_fields(raw)?;
    from_fields(&fields).with_context(|| format!("invalid {} arguments", C::OPERATION))
}

fn print_region<T: Serialize>(name: &str, state: &ViewState<T>) -> Result<()> {
    println!("{}", render_region(name, state)?);
    if let ViewState::Error(err) = state {
        bail!("{name} failed: {err:?}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let config = ClientConfig {
        server_url: args.server_url,
        encoding: if args.legacy_paths {
            RequestEncoding::LegacyPath
        } else {
            RequestEncoding::Query
        },
        timeout: args.timeout_secs.map(Duration::from_secs),
    };
    let client = LedgerClient::new(&config).context("failed to build ledger client")?;
    info!(server_url = %config.server_url, encoding = ?config.encoding, "console ready");
    let mut console = Console::new(client);

    match args.action {
        Action::Groups => {
            console.query_all_groups().await;
            print_region("groups", &console.groups)
        }
        Action::Users => {
            console.query_all_users().await;
            print_region("users", &console.users)
        }
        Action::AddGroup { fields } => {
            console.add_group(&command(&fields)?).await;
            print_region("add_group", &console.add_group)
        }
        Action::AddUser { fields } => {
            console.add_user(&command(&fields)?).await;
            print_region("add_user", &console.add_user)
        }
        Action::GenerateSet { fields } => {
            console.generate_set_for_group(&command(&fields)?).await;
            print_region("generated_set", &console.generated_set)
        }
        Action::UserRecord { id } => {
            console.get_user_record(&id).await;
            print_region("user_record", &console.user_record)
        }
        Action::PrepareDelivery { fields } => {
            console.prepare_for_delivery(&command(&fields)?).await;
            print_region("delivery_items", &console.delivery_items)
        }
        Action::Deliver {
            group,
            course,
            item,
            rate,
        } => {
            console
                .prepare_for_delivery(&PrepareDelivery { group, course })
                .await;
            print_region("delivery_items", &console.delivery_items)?;
            let selected = console
                .delivery_items
                .success()
                .and_then(|items| items.iter().find(|entry| entry.key() == item))
                .cloned()
                .ok_or_else(|| anyhow!("no exam item with key {item}"))?;
            if !console.select_item(selected) {
                bail!("exam item {item} is already rated");
            }
            console.deliver_selected(&rate).await;
            print_region("delivery", &console.delivery)
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
