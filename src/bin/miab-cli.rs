#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for administering a Mail-in-a-Box box and watching inboxes

use clap::{Parser, Subcommand};
use miab_client::{
    Envelope, FilterCriteria, MiabClient, MiabConfig, ParsedMessage, WaitOptions, domain_names,
    mailbox_addresses,
};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "miab-cli")]
#[command(about = "Admin and inbox CLI for Mail-in-a-Box")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as a JSON `{success, response}` envelope
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a mailbox (username and password are generated if omitted)
    Create {
        /// Domain to create the mailbox on
        domain: String,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Delete a mailbox
    Delete { email: String },

    /// Set a mailbox password (generated if omitted)
    Password {
        email: String,

        #[arg(long)]
        password: Option<String>,
    },

    /// Grant the admin privilege
    MakeAdmin { email: String },

    /// Revoke the admin privilege
    RemoveAdmin { email: String },

    /// List mail users by domain
    Mailboxes,

    /// List aliases by domain
    Aliases,

    /// Add an alias
    AliasAdd {
        address: String,

        /// Comma-separated destination addresses
        forwards_to: String,
    },

    /// Remove an alias
    AliasRemove { address: String },

    /// List web domains
    Domains,

    /// Show the Mail-in-a-Box version
    Version,

    /// List the INBOX of a mailbox
    Inbox {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Wait for a matching email to arrive
    Wait {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Body pattern (regex, or literal text if not a valid regex)
        #[arg(long = "pattern")]
        patterns: Vec<String>,

        /// Sender must contain this text
        #[arg(long)]
        from: Option<String>,

        /// Subject must contain this text
        #[arg(long)]
        subject: Option<String>,

        /// Give up after this many seconds
        #[arg(long, default_value = "300")]
        timeout: u64,

        /// Seconds between inbox checks
        #[arg(long, default_value = "3")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = MiabClient::from_config(MiabConfig::from_env()?)?;

    match args.command {
        Command::Create {
            ref domain,
            ref username,
            ref password,
        } => {
            let result = client
                .create_mailbox(domain, username.as_deref(), password.as_deref())
                .await;
            report(args.json, result, |m| {
                println!("email:    {}", m.email);
                println!("password: {}", m.password);
            })
        }
        Command::Delete { ref email } => {
            report_text(args.json, client.delete_mailbox(email).await)
        }
        Command::Password {
            ref email,
            ref password,
        } => {
            let result = client.update_password(email, password.as_deref()).await;
            report(args.json, result, |m| {
                println!("email:    {}", m.email);
                println!("password: {}", m.password);
            })
        }
        Command::MakeAdmin { ref email } => {
            report_text(args.json, client.make_admin(email).await)
        }
        Command::RemoveAdmin { ref email } => {
            report_text(args.json, client.remove_admin(email).await)
        }
        Command::Mailboxes => report(args.json, client.get_mailboxes().await, |domains| {
            for address in mailbox_addresses(domains) {
                println!("{address}");
            }
        }),
        Command::Aliases => report(args.json, client.get_mail_aliases().await, |domains| {
            for alias in domains.iter().flat_map(|d| &d.aliases) {
                println!("{} -> {}", alias.address, alias.forwards_to.join(", "));
            }
        }),
        Command::AliasAdd {
            ref address,
            ref forwards_to,
        } => report_text(
            args.json,
            client.add_mail_alias(address, forwards_to).await,
        ),
        Command::AliasRemove { ref address } => {
            report_text(args.json, client.remove_mail_alias(address).await)
        }
        Command::Domains => report(args.json, client.get_web_domains().await, |domains| {
            for domain in domain_names(domains) {
                println!("{domain}");
            }
        }),
        Command::Version => report_text(args.json, client.get_version().await),
        Command::Inbox {
            ref email,
            ref password,
        } => report(
            args.json,
            client.fetch_emails(email, password).await,
            |messages| print_message_table(messages),
        ),
        Command::Wait {
            ref email,
            ref password,
            ref patterns,
            ref from,
            ref subject,
            timeout,
            interval,
        } => {
            let mut criteria = FilterCriteria::new().patterns(patterns.iter().map(String::as_str));
            if let Some(from) = from {
                criteria = criteria.sender(from.as_str());
            }
            if let Some(subject) = subject {
                criteria = criteria.subject(subject.as_str());
            }
            let options = WaitOptions::default()
                .timeout(Duration::from_secs(timeout))
                .interval(Duration::from_secs(interval));

            let result = client
                .wait_for_email(email, password, &criteria, &options)
                .await;
            report(args.json, result, print_message_detail)
        }
    }
}

/// Print `result` as an envelope or through `human`, failing the
/// process on error either way.
fn report<T: Serialize>(
    json: bool,
    result: miab_client::Result<T>,
    human: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if json {
        let envelope = Envelope::from_result(&result);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        if !envelope.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    human(&result?);
    Ok(())
}

fn report_text(json: bool, result: miab_client::Result<String>) -> anyhow::Result<()> {
    report(json, result, |text| println!("{text}"))
}

fn print_message_table(messages: &[ParsedMessage]) {
    if messages.is_empty() {
        println!("No emails found.");
        return;
    }

    let header = format!("{:<6} {:<20} {:<30} {}", "SEQ", "Date", "From", "Subject");
    println!("{header}");
    println!("{}", "-".repeat(100));

    for message in messages {
        println!(
            "{:<6} {:<20} {:<30} {}",
            message.seq,
            message
                .date
                .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string()),
            truncate(&message.from, 28),
            truncate(&message.subject, 40),
        );
    }

    println!("\n{} email(s)", messages.len());
}

fn print_message_detail(message: &ParsedMessage) {
    println!("Seq:     {}", message.seq);
    if let Some(date) = message.date {
        println!("Date:    {}", date.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("From:    {}", message.from);
    println!("To:      {}", message.to);
    println!("Subject: {}", message.subject);
    if let Some(id) = &message.message_id {
        println!("Msg-ID:  {id}");
    }

    println!("\n--- Body ---\n");
    println!("{}", message.text);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
