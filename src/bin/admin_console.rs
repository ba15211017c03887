use clap::{Parser, Subcommand};
use loan_backoffice::dashboard::*;
use loan_backoffice::domain_model::AdminUserId;
use loan_backoffice::logger::*;
use std::time::Duration;

/// Command-line stand-in for the admin dashboard.
#[derive(Parser, Debug)]
#[command(name = "admin_console")]
struct Cli {
    /// Base URL of the back office API
    #[arg(long, default_value = "http://127.0.0.1:3030")]
    api: String,

    #[arg(long)]
    username: String,

    #[arg(long, env = "BACKOFFICE_PASSWORD")]
    password: String,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every admin user
    Users,
    /// Delete an admin user by id
    Delete { id: AdminUserId },
    /// Fetch a First Central credit report
    Report {
        #[arg(long)]
        identifier: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logger = Logger::new_bootstrap();

    let mut client = AdminApiClient::new(&cli.api, Duration::from_secs(cli.timeout_secs))?;
    let user = client.login(&cli.username, &cli.password).await?;
    info!(username = %user.username, user_type = %user.user_type, "signed in");

    let outcome = run(&client, cli.command).await;
    if let Err(e) = client.logout().await {
        warn!("logout failed: {}", e);
    }
    outcome
}

async fn run(client: &AdminApiClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Users => {
            for user in client.list_users().await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    user.id, user.username, user.email, user.user_type, user.image_url
                );
            }
        }
        Command::Delete { id } => {
            client.delete_user(id).await?;
            println!("deleted {id}");
        }
        Command::Report { identifier } => {
            let report = client.fetch_credit_report(identifier.as_deref()).await?;
            println!("{}", report.message);
            println!("{}", serde_json::to_string_pretty(&report.data)?);
        }
    }
    Ok(())
}
