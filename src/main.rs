use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use relnotes::checkpoint::CheckpointStore;
use relnotes::config::{GITHUB_API_URL, OPENAI_API_URL, SyncConfig};
use relnotes::feed::GithubFeed;
use relnotes::notes::NotesDocument;
use relnotes::sync::{SyncEngine, discover_new_releases};
use relnotes::translate::OpenAiTranslator;

#[derive(Parser)]
#[command(name = "relnotes")]
#[command(about = "Translate new GitHub release notes into a running document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, translate and record releases published since the last run
    Sync {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show the current checkpoint and any releases waiting to be synced
    Status {
        #[command(flatten)]
        config: ConfigArgs,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Repository owner
    #[arg(long, env = "OWNER")]
    owner: String,

    /// Repository name
    #[arg(long, env = "REPO")]
    repo: String,

    /// Path of the checkpoint file holding the last-synced tag
    #[arg(long, env = "TAG_FILE")]
    tag_file: PathBuf,

    /// Path of the notes document
    #[arg(long, env = "RELEASE_NOTES_FILE")]
    notes_file: PathBuf,

    /// OpenAI API key (required for sync)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Language the notes are translated into
    #[arg(long, env = "TARGET_LANGUAGE", default_value = "Japanese")]
    lang: String,

    /// Chat model used for translation
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    model: String,

    /// Optional GitHub token for authenticated requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    github_api_url: String,

    #[arg(long, env = "OPENAI_API_URL", default_value = OPENAI_API_URL)]
    openai_api_url: String,
}

impl ConfigArgs {
    fn into_config(self) -> SyncConfig {
        SyncConfig {
            owner: self.owner,
            repo: self.repo,
            tag_file: self.tag_file,
            notes_file: self.notes_file,
            openai_api_key: self.openai_api_key.unwrap_or_default(),
            target_language: self.lang,
            model: self.model,
            github_token: self.github_token,
            github_api_url: self.github_api_url,
            openai_api_url: self.openai_api_url,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync { config } => {
            let cfg = config.into_config();
            cfg.validate()?;

            let feed = GithubFeed::new(
                &cfg.github_api_url,
                &cfg.owner,
                &cfg.repo,
                cfg.github_token.clone(),
            )?;
            let translator = OpenAiTranslator::new(
                &cfg.openai_api_url,
                &cfg.openai_api_key,
                &cfg.model,
                &cfg.target_language,
            )?;
            let checkpoint = CheckpointStore::new(&cfg.tag_file);
            let notes = NotesDocument::new(&cfg.notes_file);

            let engine = SyncEngine {
                feed: &feed,
                translator: &translator,
                checkpoint: &checkpoint,
                notes: &notes,
            };
            let outcome = engine.run()?;

            if outcome.processed.is_empty() && outcome.skipped.is_empty() {
                println!("Up to date");
            } else {
                println!(
                    "Synced {} release(s) ({} already recorded)",
                    outcome.processed.len(),
                    outcome.skipped.len()
                );
            }
        }

        Commands::Status { config, json } => {
            let cfg = config.into_config();

            let feed = GithubFeed::new(
                &cfg.github_api_url,
                &cfg.owner,
                &cfg.repo,
                cfg.github_token.clone(),
            )?;
            let checkpoint = CheckpointStore::new(&cfg.tag_file);

            let saved_tag = checkpoint.load()?;
            let pending = discover_new_releases(&feed, saved_tag.as_deref())?;

            if json {
                let status = serde_json::json!({
                    "checkpoint": saved_tag,
                    "pending": pending,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&status).context("serialize status json")?
                );
            } else {
                match &saved_tag {
                    Some(tag) => println!("checkpoint: {}", tag),
                    None => println!("checkpoint: (none, next sync walks the full history)"),
                }
                if pending.is_empty() {
                    println!("Up to date");
                } else {
                    println!("pending ({}):", pending.len());
                    for tag in pending {
                        println!("  {}", tag);
                    }
                }
            }
        }
    }

    Ok(())
}
