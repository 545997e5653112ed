// prompt2png - command line front end for image generation and editing

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

use prompt2png::cli::{Cli, Command, SessionCommand};
use prompt2png::client::{GenerationResult, ImageClient};
use prompt2png::config::AppConfig;
use prompt2png::history::{EditTurn, HistoryStore, SessionDraft};
use prompt2png::protocol::ReferenceMode;
use prompt2png::session::SessionManager;
use prompt2png::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Phase 1: Load configuration and apply CLI overrides
    let mut config = AppConfig::load_with(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting prompt2png v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the client, history store and session manager
    let client = ImageClient::new(&config)?;
    let store = HistoryStore::load(&config.history);
    let manager = SessionManager::new(client, store);

    // Phase 4: Run the requested command, racing against shutdown signals
    let outcome = tokio::select! {
        result = dispatch(&cli.command, &manager) => result,
        _ = shutdown_signal() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    // Phase 5: Persist any in-progress edit session before exiting
    manager.shutdown().await;

    outcome
}

async fn dispatch(command: &Command, manager: &SessionManager) -> Result<()> {
    match command {
        Command::Generate {
            instruction,
            save_name,
        } => {
            let result = manager
                .client()
                .generate(instruction, save_name.clone())
                .await?;
            record(manager, instruction, &result).await;
            report(&result);
        }
        Command::Reference {
            instruction,
            images,
            mode,
            save_name,
        } => {
            let mode = ReferenceMode::from_name(mode);
            let mut reference_images = Vec::with_capacity(images.len());
            for path in images {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("reading reference image {}", path.display()))?;
                reference_images.push(bytes);
            }
            let result = manager
                .client()
                .generate_with_references(instruction, &reference_images, mode, save_name.clone())
                .await?;
            record(manager, instruction, &result).await;
            report(&result);
        }
        Command::Edit {
            instruction,
            image,
            save_name,
        } => {
            let input = std::fs::read(image)
                .with_context(|| format!("reading input image {}", image.display()))?;
            let result = manager
                .client()
                .edit_with_image(instruction, &input, save_name.clone())
                .await?;
            record(manager, instruction, &result).await;
            report(&result);
        }
        Command::Session { command } => run_session(command, manager).await?,
        Command::History { limit, clear } => {
            if *clear {
                manager.clear_generation_history().await?;
                println!("generation history cleared");
                return Ok(());
            }
            let records = manager.generation_history(*limit).await;
            if records.is_empty() {
                println!("no generations recorded yet");
            }
            for record in records {
                println!(
                    "{}  {}  {}  \"{}\"",
                    record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                    if record.exists { "ok     " } else { "missing" },
                    record.image_path.display(),
                    record.instruction
                );
            }
        }
    }
    Ok(())
}

async fn run_session(command: &SessionCommand, manager: &SessionManager) -> Result<()> {
    match command {
        SessionCommand::Start { image } => run_session_loop(manager, image).await,
        SessionCommand::Apply { instruction } => {
            match manager.resume_last().await? {
                Some(draft) => info!("Resumed session with {} prior turns", draft.turns.len()),
                None => anyhow::bail!("no saved edit session to continue; run `session start` first"),
            }
            let result = manager.apply_turn(instruction).await?;
            report(&result);
            Ok(())
        }
        SessionCommand::Show => {
            let sessions = manager.session_history().await;
            match sessions.last() {
                Some(session) => {
                    println!(
                        "session {} started {} on {}",
                        session.id,
                        session
                            .created_at
                            .with_timezone(&Local)
                            .format("%Y-%m-%d %H:%M:%S"),
                        session.original_image_path.display()
                    );
                    print_turns(&session.turns);
                    println!("current image: {}", session.current_image_path.display());
                }
                None => println!("no saved sessions"),
            }
            Ok(())
        }
        SessionCommand::Clear => {
            manager.clear_saved_sessions().await?;
            println!("saved sessions cleared");
            Ok(())
        }
    }
}

/// Interactive edit loop: each line of input is one edit instruction.
async fn run_session_loop(manager: &SessionManager, base_image: &Path) -> Result<()> {
    manager.start_session(base_image).await?;
    println!("editing {}", base_image.display());
    println!("type an instruction per line; commands: new <path>, done, show, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("edit> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        if line == "show" {
            match manager.active_session().await {
                Some(draft) => print_draft(&draft),
                None => println!("no active session; start one with `new <path>`"),
            }
            continue;
        }
        if line == "done" {
            match manager.start_new_session().await {
                Ok(Some(id)) => println!("session {id} saved; `new <path>` starts the next one"),
                Ok(None) => println!("nothing to save"),
                Err(e) => eprintln!("could not save session: {e}"),
            }
            continue;
        }
        if let Some(path) = line.strip_prefix("new ") {
            match manager.start_session(Path::new(path.trim())).await {
                Ok(()) => println!("editing {}", path.trim()),
                Err(e) => eprintln!("could not start session: {e}"),
            }
            continue;
        }
        match manager.apply_turn(line).await {
            Ok(result) => report(&result),
            Err(e) => eprintln!("edit failed: {e}"),
        }
    }
    Ok(())
}

fn print_draft(draft: &SessionDraft) {
    println!(
        "editing since {} on {}",
        draft
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S"),
        draft.original_image_path.display()
    );
    print_turns(&draft.turns);
    println!("current image: {}", draft.current_image_path.display());
}

fn print_turns(turns: &[EditTurn]) {
    for (index, turn) in turns.iter().enumerate() {
        println!(
            "  {}. \"{}\" -> {}",
            index + 1,
            turn.instruction,
            turn.result_image_path.display()
        );
    }
}

fn report(result: &GenerationResult) {
    println!(
        "saved: {} ({} bytes)",
        result.saved_path.display(),
        result.byte_length
    );
}

async fn record(manager: &SessionManager, instruction: &str, result: &GenerationResult) {
    if let Err(e) = manager
        .record_generation(instruction, &result.saved_path)
        .await
    {
        warn!("Could not record generation in history: {}", e);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
