//! Bookpress binary: book preview front-end over the remote render service.

mod cli;

use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::io::AsyncBufReadExt;

use bookpress::config::{self, Config};
use bookpress::context::ServiceContext;
use bookpress::error::PreviewError;
use bookpress::output::{resolve_output_path, save_page};
use bookpress::params::{validate_debounce_ms, validate_format};
use bookpress::render::RenderEvent;
use bookpress::session::{EditorSession, SessionConfig};

use crate::cli::Cli;

/// Sample text used when watch mode starts without any input.
const DEFAULT_TEXT: &str = "Minecraft book editor!
&cS&6u&ep&ap&9o&br&5t&cs &ec&ao&9l&bo&5u&cr&6s&e!

&r&lAnd bold
&r&oAnd italics
&rThough no underline and strikethrough yet.";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), PreviewError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(PreviewError::Config)?;

    // Resolve input text
    let text = cli.resolve_text()?;
    if text.is_none() && !cli.watch {
        return Err(PreviewError::InvalidArgument(
            "Provide text to render, use -p/--text-file, or pass --watch".into(),
        ));
    }

    // Resolve and validate parameters, falling back to config defaults
    let format = cli.format.clone().unwrap_or_else(|| config.defaults.format.clone());
    let debounce_ms = cli.debounce_ms.unwrap_or(config.defaults.debounce_ms);
    validate_format(&format).map_err(PreviewError::InvalidArgument)?;
    validate_debounce_ms(debounce_ms).map_err(PreviewError::InvalidArgument)?;

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("BOOKPRESS_REPLAY").ok();
    let is_recording = std::env::var("BOOKPRESS_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        if cli.verbose {
            eprintln!("Replaying from: {cassette_path}");
        }
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        if cli.verbose {
            eprintln!("Recording mode enabled");
        }
        let (ctx, session) = ServiceContext::recording(&config, cli.service_url.as_deref())?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config, cli.service_url.as_deref())?, None)
    };

    let session = EditorSession::spawn(
        Arc::clone(&ctx.generator),
        SessionConfig {
            debounce_window: Duration::from_millis(debounce_ms),
            initial_text: String::new(),
        },
    );

    // Surface render outcomes; in watch mode with an explicit output path the
    // file is refreshed after every successful render.
    let last_failure: Arc<Mutex<Option<String>>> = Arc::default();
    {
        let last_failure = Arc::clone(&last_failure);
        let canvas = session.canvas();
        let verbose = cli.verbose;
        let format = format.clone();
        let live_output = if cli.watch {
            cli.output.as_deref().map(std::path::PathBuf::from)
        } else {
            None
        };
        session.set_on_event(move |event| match event {
            RenderEvent::Failed { message, .. } => {
                eprintln!("Render failed: {message}");
                *last_failure.lock().expect("failure slot poisoned") = Some(message.clone());
            }
            RenderEvent::Completed { seq } => {
                if verbose {
                    eprintln!("Rendered page (request {seq})");
                }
                if let Some(path) = &live_output {
                    let saved = canvas
                        .lock()
                        .expect("canvas lock poisoned")
                        .to_png()
                        .and_then(|png| save_page(&png, &format, path));
                    if let Err(e) = saved {
                        eprintln!("Warning: failed to update {}: {e}", path.display());
                    }
                }
            }
            _ => {}
        });
    }

    // Feed input
    let final_text = if cli.watch {
        watch_input(&session, text.unwrap_or_else(|| DEFAULT_TEXT.to_string())).await?
    } else {
        let text = text.unwrap_or_default();
        session.set_input(text.clone());
        text
    };

    session.drain().await;

    if session.last_drawn() == 0 {
        let message = last_failure
            .lock()
            .expect("failure slot poisoned")
            .take()
            .unwrap_or_else(|| "no page image was rendered".into());
        return Err(PreviewError::Generate(message));
    }

    // Save the final page
    let output_path = resolve_output_path(cli.output.as_deref(), &final_text, &format);
    let png = session.canvas_png()?;
    save_page(&png, &format, &output_path)?;
    eprintln!("Saved: {}", output_path.display());

    session.shutdown();
    drop(ctx);

    // Finish recording if active
    if let Some(rec) = recording_session {
        match rec.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    Ok(())
}

/// Read stdin lines as incremental input mutations until EOF, returning the
/// final buffer.
async fn watch_input(session: &EditorSession, initial: String) -> Result<String, PreviewError> {
    let mut buffer = initial;
    session.set_input(buffer.clone());

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        buffer.push('\n');
        buffer.push_str(&line);
        session.set_input(buffer.clone());
    }
    Ok(buffer)
}
