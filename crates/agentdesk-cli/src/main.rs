//! AgentDesk CLI - Command line interface for the AgentDesk control plane.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info_span, Instrument};
use tracing_subscriber::EnvFilter;

use agentdesk_admin_client::HttpClient;
use agentdesk_core::{AgentId, AgentRegistration};
use agentdesk_pipeline::{CommitReport, FileKind, Pipeline, PipelineError};

/// Width of the progress bar in characters.
const PROGRESS_WIDTH: usize = 30;

/// AgentDesk CLI - Agent and lead distribution management tool
#[derive(Parser)]
#[command(name = "agentdesk")]
#[command(about = "CLI for the AgentDesk control plane", long_about = None)]
struct Cli {
    /// Control plane address
    #[arg(
        short,
        long,
        env = "AGENTDESK_API_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    addr: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new agent
    #[command(name = "add-agent")]
    AddAgent {
        /// Agent display name
        #[arg(long)]
        name: String,

        /// Login email
        #[arg(long)]
        email: String,

        /// Mobile number without country code
        #[arg(long)]
        mob_number: String,

        /// Dialling prefix
        #[arg(long, default_value = "+1")]
        country_code: String,
    },

    /// List registered agents
    #[command(name = "list-agents")]
    ListAgents {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one agent and its tasks
    #[command(name = "get-agent")]
    GetAgent {
        /// Agent ID
        id: String,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Distribute a CSV/XLS/XLSX lead sheet across all agents
    Distribute {
        /// Spreadsheet to upload
        file: PathBuf,

        /// Declared MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime_type: Option<String>,

        /// Administrator running the upload
        #[arg(long, default_value = "admin")]
        admin: String,
    },

    /// Check control plane health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agentdesk_cli=info,agentdesk_pipeline=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = HttpClient::with_timeout(&cli.addr, Duration::from_secs(cli.timeout_secs))?;

    match cli.command {
        Commands::AddAgent {
            name,
            email,
            mob_number,
            country_code,
        } => {
            let registration =
                AgentRegistration::new(name, email, mob_number).with_country_code(country_code);
            add_agent(&client, registration).await?;
        }
        Commands::ListAgents { json } => {
            list_agents(&client, json).await?;
        }
        Commands::GetAgent { id, json } => {
            get_agent(&client, AgentId::new(id), json).await?;
        }
        Commands::Distribute {
            file,
            mime_type,
            admin,
        } => {
            distribute(&client, &file, mime_type, &admin).await?;
        }
        Commands::Health => {
            health(&client).await?;
        }
    }

    Ok(())
}

async fn add_agent(
    client: &HttpClient,
    registration: AgentRegistration,
) -> Result<(), Box<dyn std::error::Error>> {
    let agent = client.register_agent(&registration).await?;

    println!("Agent registered:");
    println!("  ID:         {}", agent.id);
    println!("  Name:       {}", agent.name);
    println!("  Email:      {}", agent.email);
    println!("  Phone:      {} {}", agent.country_code, agent.mob_number);

    Ok(())
}

async fn list_agents(client: &HttpClient, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let agents = client.list_agents().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&agents)?);
        return Ok(());
    }

    println!("Agents ({}):", agents.len());
    println!(
        "{:<36}  {:<20}  {:<28}  {:>5}  {}",
        "ID", "NAME", "EMAIL", "TASKS", "CREATED"
    );
    println!("{}", "-".repeat(112));

    for agent in agents {
        println!(
            "{:<36}  {:<20}  {:<28}  {:>5}  {}",
            agent.id,
            agent.name,
            agent.email,
            agent.tasks.len(),
            agent.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}

async fn get_agent(
    client: &HttpClient,
    id: AgentId,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = client.get_agent(&id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("  ID:         {}", id);
    println!("  Name:       {}", profile.name);
    println!("  Email:      {}", profile.email);
    println!("  Phone:      {} {}", profile.country_code, profile.mob_number);

    if profile.tasks.is_empty() {
        println!("  Tasks:      none");
    } else {
        println!("  Tasks ({}):", profile.tasks.len());
        for task in &profile.tasks {
            println!(
                "    - {:<20}  {:<16}  {}",
                task.first_name, task.mob_number, task.notes
            );
        }
    }

    Ok(())
}

async fn distribute(
    client: &HttpClient,
    file: &Path,
    mime_type: Option<String>,
    admin: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mime = match mime_type {
        Some(mime) => mime,
        None => mime_for_path(file)
            .ok_or_else(|| {
                format!(
                    "Cannot infer the type of '{}'; pass --mime-type",
                    file.display()
                )
            })?
            .to_string(),
    };

    let bytes = tokio::fs::read(file)
        .await
        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;

    let span = info_span!("upload", admin = %admin, file = %file.display());
    let mut pipeline = Pipeline::new();

    let count = span.in_scope(|| pipeline.load(&bytes, &mime))?;
    println!("Loaded {} records from {}", count, file.display());

    let result = pipeline
        .distribute(client, |fraction| {
            println!("{}", progress_bar(fraction, PROGRESS_WIDTH));
        })
        .instrument(span)
        .await;

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(PipelineError::Commit(report)) => {
            print_report(&report);
            Err("distribution incomplete".into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn health(client: &HttpClient) -> Result<(), Box<dyn std::error::Error>> {
    if client.health().await? {
        println!("Control plane at {} is healthy", client.base_url());
        Ok(())
    } else {
        Err(format!("Control plane at {} is unhealthy", client.base_url()).into())
    }
}

fn print_report(report: &CommitReport) {
    println!("{}", report);
    println!("  Batch:      {}", report.batch_id);
    println!(
        "  Agents:     {}/{}",
        report.committed_buckets(),
        report.total_buckets
    );
    println!("  Tasks:      {}", report.tasks_committed);

    if !report.not_attempted.is_empty() {
        let skipped: Vec<&str> = report.not_attempted.iter().map(|id| id.as_str()).collect();
        println!("  Skipped:    {}", skipped.join(", "));
    }
}

/// MIME type for a spreadsheet path, by extension.
fn mime_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(FileKind::from_extension)
        .map(|kind| kind.mime())
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("leads.csv")), Some("text/csv"));
        assert_eq!(
            mime_for_path(Path::new("/tmp/Leads.XLSX")),
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        );
        assert_eq!(
            mime_for_path(Path::new("old.xls")),
            Some("application/vnd.ms-excel")
        );
        assert_eq!(mime_for_path(Path::new("notes.pdf")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[----]   0%");
        assert_eq!(progress_bar(1.0 / 3.0, 9), "[###------]  33%");
        assert_eq!(progress_bar(1.0, 4), "[####] 100%");
        assert_eq!(progress_bar(1.5, 4), "[####] 100%");
    }

    #[test]
    fn test_cli_parses_distribute() {
        let cli = Cli::try_parse_from([
            "agentdesk",
            "--addr",
            "http://localhost:9000",
            "distribute",
            "leads.csv",
            "--admin",
            "root",
        ])
        .unwrap();

        assert_eq!(cli.addr, "http://localhost:9000");
        match cli.command {
            Commands::Distribute {
                file,
                mime_type,
                admin,
            } => {
                assert_eq!(file, PathBuf::from("leads.csv"));
                assert_eq!(mime_type, None);
                assert_eq!(admin, "root");
            }
            _ => panic!("expected distribute"),
        }
    }
}
