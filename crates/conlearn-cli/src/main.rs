//! ConLearn CLI: sign up, upload a file, list and delete uploads.
//!
//! Set CONLEARN_API_URL, FIREBASE_API_KEY, and CONLEARN_EMAIL / CONLEARN_PASSWORD
//! (or pass --email / --password).

use anyhow::Context;
use clap::{Parser, Subcommand};
use conlearn_cli::{init_tracing, print_json, progress_bar};
use conlearn_client::gallery::{render_gallery, render_text};
use conlearn_client::identity::{FirebaseAuth, Identity, IdentityProvider};
use conlearn_client::orchestrator::{SelectedFile, UploadEvent, UploadOrchestrator};
use conlearn_client::uploader::HttpObjectUploader;
use conlearn_client::ApiClient;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "conlearn", about = "ConLearn media upload CLI")]
struct Cli {
    /// Files API base URL
    #[arg(long, env = "CONLEARN_API_URL", default_value = conlearn_client::DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "CONLEARN_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "CONLEARN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup,
    /// Upload an image or video
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
    },
    /// List your uploads, newest first
    List,
    /// Delete one of your uploads
    Delete {
        /// Upload UUID
        upload_id: Uuid,
    },
}

fn credentials(cli: &Cli) -> anyhow::Result<(String, String)> {
    let email = cli
        .email
        .clone()
        .context("Missing email. Pass --email or set CONLEARN_EMAIL")?;
    let password = cli
        .password
        .clone()
        .context("Missing password. Pass --password or set CONLEARN_PASSWORD")?;
    Ok((email, password))
}

async fn login(auth: &FirebaseAuth, cli: &Cli) -> anyhow::Result<Identity> {
    let (email, password) = credentials(cli)?;
    auth.login(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.friendly_message()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    tracing::debug!(api_url = %cli.api_url, "Using files API");

    let auth = FirebaseAuth::from_env().map_err(|e| anyhow::anyhow!(e.friendly_message()))?;
    let client = ApiClient::new(&cli.api_url).context("Failed to create API client")?;

    match &cli.command {
        Commands::Signup => {
            let (email, password) = credentials(&cli)?;
            let identity = auth
                .sign_up(&email, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.friendly_message()))?;
            print_json(&serde_json::json!({
                "userId": identity.user_id,
                "email": identity.email,
            }))?;
        }
        Commands::Upload { file } => {
            login(&auth, &cli).await?;
            let selected = SelectedFile::from_path(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let uploader = HttpObjectUploader::new().context("Failed to create uploader")?;
            let mut orchestrator = UploadOrchestrator::new(
                Arc::new(client),
                Arc::new(uploader),
                auth.state().clone(),
            );

            let mut events = orchestrator.events();
            let show_progress = !cli.json;
            let printer = tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    match event {
                        UploadEvent::Status(message) if show_progress => eprintln!("{}", message),
                        UploadEvent::Progress(p) if show_progress => {
                            eprintln!("{}", progress_bar(p.percent, p.exact))
                        }
                        UploadEvent::GalleryRefreshed(count) => {
                            tracing::debug!(count, "Gallery refreshed")
                        }
                        _ => {}
                    }
                }
            });

            orchestrator.select_file(selected);
            let result = orchestrator.upload().await;
            let cards = orchestrator.cards();
            drop(orchestrator);
            let _ = printer.await;

            let done = result?;
            if cli.json {
                print_json(&done)?;
            } else {
                println!("Uploaded {} -> {}", done.upload_id, done.s3_url);
                println!("{}", render_text(&cards));
            }
        }
        Commands::List => {
            let identity = login(&auth, &cli).await?;
            let uploads = client.list_uploads(&identity.user_id).await?;
            if cli.json {
                print_json(&uploads)?;
            } else {
                println!("{}", render_text(&render_gallery(&uploads)));
            }
        }
        Commands::Delete { upload_id } => {
            let identity = login(&auth, &cli).await?;
            let deleted = client.delete_upload(&identity.user_id, *upload_id).await?;
            print_json(&deleted)?;
        }
    }

    auth.logout().await.ok();
    Ok(())
}
