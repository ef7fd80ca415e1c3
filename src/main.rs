//! mailbrief CLI - summarise unread mail into WhatsApp notifications
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{Parser, Subcommand};
use mailbrief::summarize::DEFAULT_SUMMARY_SENTENCES;
use mailbrief::{Config, GmailClient, Language, NotifierService, Summarizer, WhatsAppSender};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mailbrief")]
#[command(author, version, about = "Summarise unread mail and forward it to WhatsApp", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the inbox and forward summaries continuously
    Watch,
    /// Run a single inbox check and exit
    Check,
    /// Summarise a text file (or stdin) and print the result
    Summarise {
        /// File to summarise; reads stdin when omitted
        file: Option<PathBuf>,
        /// Number of sentences to keep
        #[arg(long, default_value_t = DEFAULT_SUMMARY_SENTENCES)]
        sentences: usize,
        /// Summary language
        #[arg(long, default_value = "english")]
        language: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailbrief=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Summarise {
            file,
            sentences,
            language,
        }) => {
            let language = Language::from_tag(&language)
                .ok_or_else(|| anyhow::anyhow!("unsupported summary language: {}", language))?;
            let text = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let summarizer = Summarizer::new(language);
            println!("{}", summarizer.summarize(&text, sentences));
        }
        Some(Commands::Check) => {
            let mut service = build_service()?;
            let delivered = service.check_cycle().await?;
            println!("✅ Check complete: {} notification(s) delivered", delivered);
        }
        Some(Commands::Watch) | None => {
            let mut service = build_service()?;
            tokio::select! {
                _ = service.run() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received, stopping");
                }
            }
        }
    }

    Ok(())
}

/// Assemble the service, failing fast on missing credentials or an
/// unsupported language so nothing degrades after startup
fn build_service() -> anyhow::Result<NotifierService> {
    let config = Config::load()?;
    let summarizer = Summarizer::new(config.language()?);
    let gmail = GmailClient::new(config.gmail_secrets()?)?;
    let sender = WhatsAppSender::new(config.twilio_secrets()?, config.whatsapp.clone())?;
    Ok(NotifierService::new(config, gmail, sender, summarizer))
}
