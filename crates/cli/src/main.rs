#![deny(warnings)]

mod clipboard;
mod store;

use anyhow::Context;
use bilingual_pad_core::config::{resolve_provider_config, StdEnv};
use bilingual_pad_core::glossary::GlossaryMap;
use bilingual_pad_core::lang::{is_japanese, Direction, Pane};
use bilingual_pad_core::orchestrator::{Orchestrator, SharedPanes, TranslateOutcome};
use bilingual_pad_core::scheduler::AutoTranslateScheduler;
use bilingual_pad_core::settings::{MemoryStore, Settings};
use bilingual_pad_core::translate::HttpProviders;
use clap::{Parser, Subcommand};
use clipboard::SystemClipboard;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bilingual-pad")]
#[command(about = "Japanese/English scratch pad backed by DeepL, Google or a custom proxy")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON file holding pane texts, provider selection and glossaries.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    provider: ProviderArgs,

    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(clap::Args, Debug)]
struct ProviderArgs {
    /// deepl, google or custom
    #[arg(long, global = true)]
    provider: Option<String>,

    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[arg(long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate TEXT once and print the result.
    Translate {
        /// ja-en or en-ja; detected from the text when omitted.
        #[arg(long)]
        direction: Option<Direction>,

        /// Glossary file (`term=replacement` per line) for this direction.
        #[arg(long)]
        glossary: Option<PathBuf>,

        text: String,
    },
    /// Read lines from stdin and translate them as you type.
    Live,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let mut store = match &args.settings {
        Some(path) => store::load(path)?,
        None => MemoryStore::default(),
    };
    let mut settings = Settings::load(&store);
    settings.provider = resolve_provider_config(
        args.provider.provider,
        args.provider.endpoint,
        args.provider.api_key,
        &StdEnv,
        settings.provider,
    )?;

    tracing::info!(
        provider = ?settings.provider.kind,
        live = settings.live,
        "settings loaded"
    );

    let orchestrator = Orchestrator::new(HttpProviders::new()?);

    match args.command {
        Command::Translate {
            direction,
            glossary,
            text,
        } => {
            let direction = direction.unwrap_or_else(|| detect_direction(&text));
            if let Some(path) = glossary {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading glossary {}", path.display()))?;
                *settings.glossaries.for_direction_mut(direction) = GlossaryMap::parse(&raw);
            }
            settings.panes.set(direction.source_pane(), text);
            let panes = settings.panes.clone().into_shared();

            match orchestrator
                .translate(direction, &panes, &settings.glossaries, &settings.provider)
                .await?
            {
                TranslateOutcome::Translated { text, .. } => println!("{text}"),
                TranslateOutcome::Skipped => anyhow::bail!("nothing to translate"),
            }
            settings.panes = panes.lock().await.clone();
        }
        Command::Live => {
            settings.live = true;
            let panes = settings.panes.clone().into_shared();
            run_live(&orchestrator, &panes, &settings).await?;
            settings.panes = panes.lock().await.clone();
        }
    }

    if let Some(path) = &args.settings {
        settings.save(&mut store);
        store::save(path, store)?;
    }
    Ok(())
}

fn detect_direction(text: &str) -> Direction {
    if is_japanese(text) {
        Direction::JaToEn
    } else {
        Direction::EnToJa
    }
}

const LIVE_HELP: &str = "type text to fill the matching pane; commands: :tr, :undo, :swap, :clear, :copy ja|en, :show, :quit";

async fn run_live(
    orchestrator: &Orchestrator,
    panes: &SharedPanes,
    settings: &Settings,
) -> anyhow::Result<()> {
    let (mut scheduler, mut triggers) = AutoTranslateScheduler::new(settings.live);
    let clipboard = SystemClipboard::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_edited = Pane::En;
    eprintln!("{LIVE_HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                match line.trim() {
                    ":quit" => break,
                    ":show" => print_panes(panes).await,
                    ":undo" => {
                        if orchestrator.undo(panes).await {
                            print_panes(panes).await;
                        } else {
                            eprintln!("nothing to undo");
                        }
                    }
                    ":swap" => {
                        orchestrator.swap(panes).await;
                        print_panes(panes).await;
                    }
                    ":clear" => {
                        scheduler.cancel_all();
                        orchestrator.clear(panes).await;
                    }
                    ":copy ja" => orchestrator.copy_pane(panes, Pane::Ja, &clipboard).await,
                    ":copy en" => orchestrator.copy_pane(panes, Pane::En, &clipboard).await,
                    ":tr" => {
                        let direction = Direction::for_source_pane(last_edited);
                        run_translation(orchestrator, panes, settings, direction).await;
                    }
                    cmd if cmd.starts_with(':') => eprintln!("{LIVE_HELP}"),
                    _ => {
                        let pane = if is_japanese(&line) { Pane::Ja } else { Pane::En };
                        panes.lock().await.set(pane, line.clone());
                        scheduler.on_change(pane, &line);
                        last_edited = pane;
                    }
                }
            }
            Some(trigger) = triggers.recv() => {
                run_translation(orchestrator, panes, settings, trigger.direction).await;
            }
        }
    }

    scheduler.cancel_all();
    Ok(())
}

async fn run_translation(
    orchestrator: &Orchestrator,
    panes: &SharedPanes,
    settings: &Settings,
    direction: Direction,
) {
    if orchestrator.is_busy() {
        eprintln!("translation already running");
        return;
    }
    match orchestrator
        .translate(direction, panes, &settings.glossaries, &settings.provider)
        .await
    {
        Ok(TranslateOutcome::Translated { .. }) => print_panes(panes).await,
        Ok(TranslateOutcome::Skipped) => {}
        Err(e) => eprintln!("error: {e}"),
    }
}

async fn print_panes(panes: &SharedPanes) {
    let state = panes.lock().await;
    println!("JA: {}\nEN: {}", state.ja, state.en);
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
