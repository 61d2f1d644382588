use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::app::AppController;
use crate::commands::{execute, Command, Reply, HELP};
use crate::domain::{DomainError, ModelState, UiEvent};

/// Format one session event for the terminal. `None` means nothing to show.
pub fn render(event: &UiEvent) -> Option<String> {
    match event {
        UiEvent::DevicesChanged(devices) if devices.is_empty() => {
            Some("no input devices (try `refresh`)".to_string())
        }
        UiEvent::DevicesChanged(devices) => Some(
            devices
                .iter()
                .map(|d| format!("index: {} device: {}", d.index, d.name))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        UiEvent::ValidationNotice(message) => Some(format!("!! {}", message)),
        UiEvent::DeviceConfirmed { device_id } => Some(format!(
            "using device {}. type `load` to load the model",
            device_id
        )),
        UiEvent::ModelStateChanged(ModelState::Loading) => Some("[Loading Model]".to_string()),
        UiEvent::ModelStateChanged(ModelState::NotLoaded) => Some("[Load Model]".to_string()),
        // The ModelLoaded notice follows immediately.
        UiEvent::ModelStateChanged(ModelState::Loaded) => None,
        UiEvent::ModelLoaded => Some("Model loaded successfully".to_string()),
        UiEvent::TranscriptChanged(snapshot) => Some(format!(
            "> {}\n  {}",
            snapshot.final_text, snapshot.partial_text
        )),
        UiEvent::Closed => None,
    }
}

fn print(text: &str) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{}", text);
    let _ = out.flush();
}

async fn render_events(mut events: broadcast::Receiver<UiEvent>) {
    loop {
        match events.recv().await {
            Ok(UiEvent::Closed) => break,
            Ok(event) => {
                if let Some(text) = render(&event) {
                    print(&text);
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "renderer lagged behind session events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Feed input lines to `on_line` until it returns `false`, the input ends,
/// or `interrupt` resolves. The interrupt future lives across iterations.
async fn read_commands<R, S, F>(input: R, interrupt: S, mut on_line: F) -> Result<(), DomainError>
where
    R: AsyncBufRead + Unpin,
    S: Future,
    F: FnMut(&str) -> bool,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !on_line(&line) {
                        return Ok(());
                    }
                }
                None => {
                    debug!("stdin closed");
                    return Ok(());
                }
            },
            _ = &mut interrupt => {
                debug!("interrupted");
                return Ok(());
            }
        }
    }
}

/// Interactive loop: read commands from stdin, render session events to
/// stdout, until `quit`, end of input, or Ctrl-C.
pub async fn run_shell(app: &AppController) -> Result<(), DomainError> {
    let renderer = tokio::spawn(render_events(app.session().subscribe()));
    print(HELP);

    let outcome = read_commands(
        BufReader::new(tokio::io::stdin()),
        tokio::signal::ctrl_c(),
        |line| match execute(app, Command::parse(line)) {
            Reply::Silent => true,
            Reply::Text(text) => {
                print(&text);
                true
            }
            Reply::Quit => false,
        },
    )
    .await;

    app.shutdown();
    let _ = renderer.await;
    outcome
}
