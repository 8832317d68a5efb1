use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use mailing_list::client::MailingListClient;
use mailing_list::model::EmailEntry;

#[derive(Debug, Parser)]
#[command(author, version, about = "Command-line client for the mailing list RPC server")]
struct Args {
    /// Base URL of the server
    #[arg(long, default_value = "http://127.0.0.1:8081")]
    server: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Look up one subscriber
    Get { email: String },
    /// List subscribers by id, zero-based pages
    List {
        #[arg(long, default_value_t = 0)]
        page: i32,
        #[arg(long, default_value_t = 20)]
        count: i32,
    },
    /// Add a subscriber
    Create { email: String },
    /// Change the confirmation time and/or opt-out flag of a subscriber.
    /// Fields not given keep their stored value.
    Update {
        email: String,
        /// Confirmation time in seconds since the Unix epoch
        #[arg(long)]
        confirmed_at: Option<i64>,
        /// `true` to exclude the subscriber from outbound use, `false` to re-include
        #[arg(long)]
        opt_out: Option<bool>,
    },
    /// Remove a subscriber
    Delete { email: String },
}

fn merge_update(
    current: EmailEntry,
    confirmed_at: Option<i64>,
    opt_out: Option<bool>,
) -> EmailEntry {
    EmailEntry {
        confirmed_at: confirmed_at.unwrap_or(current.confirmed_at),
        opt_out: opt_out.unwrap_or(current.opt_out),
        ..current
    }
}

fn print_entry(entry: Option<EmailEntry>) -> Result<()> {
    match entry {
        Some(e) => println!("{}", serde_json::to_string_pretty(&e)?),
        None => println!("(no entry)"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let client = MailingListClient::new(args.server);

    match args.cmd {
        Cmd::Get { email } => print_entry(client.get_email(&email).await?)?,
        Cmd::List { page, count } => {
            let entries = client.get_email_batch(page, count).await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Cmd::Create { email } => print_entry(client.create_email(&email).await?)?,
        Cmd::Update {
            email,
            confirmed_at,
            opt_out,
        } => {
            let current = client
                .get_email(&email)
                .await?
                .ok_or_else(|| anyhow!("no subscriber with address {email}"))?;
            let entry = merge_update(current, confirmed_at, opt_out);
            print_entry(client.update_email(entry).await?)?
        }
        Cmd::Delete { email } => print_entry(client.delete_email(&email).await?)?,
    }

    Ok(())
}
