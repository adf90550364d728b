//! Licenca CLI: command-line client for the Licenca API.
//!
//! Set LICENCA_TOKEN (bearer token) and LICENCA_API_URL.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use licenca_api_client::api::ProcessQuery;
use licenca_api_client::{
    ApiClient, CandidateFile, OwnerRef, UploadOrchestrator, UploadTracker,
};
use licenca_cli::{init_tracing, process_table};
use licenca_core::models::{LicenseType, NewProcessInput, ProcessUpdate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "licenca", about = "Licenca API CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a file against the upload limits without sending it
    Validate {
        file: PathBuf,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Upload a file under a process and record it
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Process the file belongs to
        #[arg(long)]
        process: Uuid,
        /// Record the file as this collaborator's procuration instead of a process document
        #[arg(long)]
        collaborator: Option<Uuid>,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Create a signed download URL for a stored file
    DownloadUrl { storage_path: String },
    /// Remove a stored file and clear its record
    Delete {
        storage_path: String,
        /// Clear this collaborator's procuration
        #[arg(long, conflicts_with = "document_of")]
        collaborator: Option<Uuid>,
        /// Remove the document record from this process
        #[arg(long, required_unless_present = "collaborator")]
        document_of: Option<Uuid>,
    },
    /// License process operations
    Processes {
        #[command(subcommand)]
        sub: ProcessCommands,
    },
    /// List the documents of a process
    Documents { process: Uuid },
}

#[derive(Subcommand)]
enum ProcessCommands {
    /// List owned and shared processes
    List {
        /// submitted, em_analise, aprovado, rejeitado or all
        #[arg(long)]
        status: Option<String>,
        /// LP, LI or LO
        #[arg(long)]
        license_type: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Show one process
    Get { id: Uuid },
    /// Create a process and upload its documents
    Create {
        /// JSON file with the new process fields
        #[arg(long)]
        input: PathBuf,
        /// Document to upload under the new process; repeatable
        #[arg(long = "document")]
        documents: Vec<PathBuf>,
    },
    /// Apply a partial update to a process
    Update {
        id: Uuid,
        /// JSON file with the fields to change
        #[arg(long)]
        input: PathBuf,
    },
    /// Delete a process
    Delete { id: Uuid },
    /// Counts by status
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

async fn candidate(file: &PathBuf, content_type: Option<&str>) -> anyhow::Result<CandidateFile> {
    CandidateFile::from_path(file, content_type)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Validate { file, content_type } = &cli.command {
        let file = candidate(file, content_type.as_deref()).await?;
        let outcome = licenca_core::FileValidator::default().check(file.size(), &file.content_type);
        print_json(&outcome)?;
        return Ok(());
    }

    let client = ApiClient::from_env()
        .context("Failed to create API client. Set LICENCA_TOKEN and LICENCA_API_URL")?;
    let orchestrator = UploadOrchestrator::new(client.clone());

    match cli.command {
        Commands::Validate { .. } => {}
        Commands::Upload {
            file,
            process,
            collaborator,
            content_type,
        } => {
            let file = candidate(&file, content_type.as_deref()).await?;
            let owner = match collaborator {
                Some(id) => OwnerRef::Collaborator(id),
                None => OwnerRef::ProcessDocument(process),
            };

            let tracker = UploadTracker::new();
            let mut progress = tracker.subscribe_progress();
            let reporter = tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    let value = *progress.borrow_and_update();
                    eprint!("\rEnviando... {:>3}%", value);
                }
                eprintln!();
            });

            let result = orchestrator
                .run(owner, &process.to_string(), &file, &tracker)
                .await;
            drop(tracker);
            reporter.await.ok();

            let uploaded = result?;
            print_json(&uploaded.stored())?;
        }
        Commands::DownloadUrl { storage_path } => {
            let response = orchestrator.get_download_url(&storage_path).await?;
            print_json(&response)?;
        }
        Commands::Delete {
            storage_path,
            collaborator,
            document_of,
        } => {
            let owner = match (collaborator, document_of) {
                (Some(id), _) => OwnerRef::Collaborator(id),
                (None, Some(process)) => OwnerRef::ProcessDocument(process),
                (None, None) => anyhow::bail!("Pass --collaborator or --document-of"),
            };
            let outcome = orchestrator.delete(&storage_path, owner).await?;
            if !outcome.storage_removed {
                eprintln!("Warning: record cleared but the stored file could not be removed");
            }
            print_json(&serde_json::json!({
                "storagePath": storage_path,
                "storageRemoved": outcome.storage_removed,
            }))?;
        }
        Commands::Processes { sub } => match sub {
            ProcessCommands::List {
                status,
                license_type,
                search,
                format,
            } => {
                let license_type = license_type
                    .map(|t| t.parse::<LicenseType>())
                    .transpose()?;
                let processes = client
                    .list_processes(&ProcessQuery {
                        status,
                        license_type,
                        search,
                    })
                    .await?;
                match format {
                    Format::Json => print_json(&processes)?,
                    Format::Table => print!("{}", process_table(&processes)),
                }
            }
            ProcessCommands::Get { id } => {
                print_json(&client.get_process(id).await?)?;
            }
            ProcessCommands::Create { input, documents } => {
                let input: NewProcessInput = read_json(&input).await?;
                let mut files = Vec::with_capacity(documents.len());
                for path in &documents {
                    files.push(candidate(path, None).await?);
                }
                let (process, uploaded) = orchestrator
                    .create_process_with_documents(&input, &files)
                    .await?;
                let stored: Vec<_> = uploaded.iter().map(|u| u.stored()).collect();
                print_json(&serde_json::json!({
                    "process": process,
                    "documents": stored,
                }))?;
            }
            ProcessCommands::Update { id, input } => {
                let update: ProcessUpdate = read_json(&input).await?;
                print_json(&client.update_process(id, &update).await?)?;
            }
            ProcessCommands::Delete { id } => {
                client.delete_process(id).await?;
                eprintln!("Process {} deleted", id);
            }
            ProcessCommands::Stats => {
                print_json(&client.process_stats().await?)?;
            }
        },
        Commands::Documents { process } => {
            print_json(&client.list_documents(process).await?)?;
        }
    }

    Ok(())
}
