//! A terminal chat client built on `little-chat` as a library.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use little_chat::SessionBuilder;
use little_chat::core::{ConversationSnapshot, SendOutcome};
use little_chat::render::{
    BAR_CHAR, PROMPT_HINT, THINKING, TITLE, TranscriptPrinter,
};
use little_chat_http_service::{BASE_URL_ENV, HEALTH_CHECK_TIMEOUT};
use little_chat_service::{ChatServiceError as _, ErrorKind};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("{}\n", TITLE.bold());

    let session = SessionBuilder::from_env().build();
    if session.http_config().and_then(|c| c.base_url()).is_none() {
        let bar = BAR_CHAR.bright_yellow();
        println!("{bar}⚠️  {BASE_URL_ENV} is not set, messages can't be sent");
    }
    // Gives up after `HEALTH_CHECK_TIMEOUT`.
    match session.check_health().await {
        Some(Err(err)) if err.kind() == ErrorKind::Timeout => {
            warn!(
                "chat service did not answer within {HEALTH_CHECK_TIMEOUT:?}, \
                 continuing anyway"
            );
        }
        Some(Err(err)) => warn!("chat service is not reachable: {err}"),
        _ => {}
    }

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut snapshot_rx = session.subscribe();
    let mut printer = TranscriptPrinter::new();
    let mut spinner: Option<ProgressBar> = None;

    println!("{}", PROMPT_HINT.dimmed());
    prompt();

    loop {
        let tick = sleep(Duration::from_millis(100));
        select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        error!("error reading input: {err}");
                        break;
                    }
                };

                // An empty line sends whatever is left in the draft.
                let outcome = if line.trim().is_empty() {
                    session.send().await
                } else {
                    session.submit(line).await
                };
                match outcome {
                    Ok(SendOutcome::Sent) => {}
                    Ok(SendOutcome::Empty) => prompt(),
                    Ok(SendOutcome::Busy) => notify_busy(spinner.as_ref()),
                    Err(err) => {
                        error!("conversation stopped: {err}");
                        break;
                    }
                }
            }
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshot_rx.borrow_and_update().clone();
                redraw(&snapshot, &mut printer, &mut spinner, &progress_style);
            }
            _ = tick, if spinner.is_some() => {
                if let Some(spinner) = &spinner {
                    spinner.tick();
                }
            }
        }
    }

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
}

fn redraw(
    snapshot: &ConversationSnapshot,
    printer: &mut TranscriptPrinter,
    spinner: &mut Option<ProgressBar>,
    progress_style: &ProgressStyle,
) {
    let new_entries = printer.render_new(snapshot.transcript());
    if new_entries.is_empty() && snapshot.is_busy() == spinner.is_some() {
        // Only the draft changed.
        return;
    }

    // Finish the spinner before printing anything else.
    if let Some(spinner) = spinner.take() {
        spinner.finish_and_clear();
    }
    for entry in new_entries {
        println!("{entry}");
    }

    if snapshot.is_busy() {
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message(THINKING);
        *spinner = Some(progress_bar);
    } else {
        println!();
        prompt();
    }
}

fn notify_busy(spinner: Option<&ProgressBar>) {
    let notify = || {
        println!(
            "{}still waiting for a reply, press Enter to send this message \
             later",
            BAR_CHAR.bright_yellow()
        );
    };
    match spinner {
        Some(spinner) => spinner.suspend(notify),
        None => notify(),
    }
}

fn prompt() {
    print!("> ");
    std::io::stdout().flush().ok();
}
