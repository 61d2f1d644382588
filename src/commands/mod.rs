//! Operator commands.
//!
//! One line of operator input maps to one [`Command`]; [`execute`] forwards
//! it to the session. Nothing here talks to the backend directly.

use crate::app::{AppController, SessionController};
use crate::domain::DomainError;

/// Text shown for `help` and for unrecognised input.
pub const HELP: &str = "\
commands:
  refresh        re-read the device list
  use <index>    select the input device with that index
  load           load the recognition model
  stop           stop listening
  status         show session state
  paths          show config and log locations
  help           show this text
  quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    /// Raw index text, validated by the session.
    Use(String),
    Load,
    Stop,
    Status,
    Paths,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "refresh" | "r" => Command::Refresh,
            "use" | "u" => Command::Use(rest.to_string()),
            "load" | "l" => Command::Load,
            "stop" => Command::Stop,
            "status" | "s" => Command::Status,
            "paths" => Command::Paths,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// What the shell should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Output arrives through session events, if at all.
    Silent,
    Text(String),
    Quit,
}

/// Run one operator command against the application.
pub fn execute(app: &AppController, command: Command) -> Reply {
    let session = app.session();
    match command {
        Command::Refresh => {
            session.refresh_device_list();
            Reply::Silent
        }
        Command::Use(raw) => submit_device(session, &raw),
        Command::Load => {
            session.load_model();
            Reply::Silent
        }
        Command::Stop => {
            session.stop_listening();
            Reply::Silent
        }
        Command::Status => Reply::Text(format!(
            "session: {:?}, model: {:?}, devices: {}, polling: {}",
            session.session_state(),
            session.model_state(),
            session.devices().len(),
            session.is_polling()
        )),
        Command::Paths => Reply::Text(format!(
            "config: {}\ndata:   {}\nlogs:   {}\nbackend: {}",
            app.config_path(),
            app.data_dir(),
            app.logs_dir(),
            app.config().backend.base_url
        )),
        Command::Help => Reply::Text(HELP.to_string()),
        Command::Quit => Reply::Quit,
        Command::Unknown(line) => {
            if line.is_empty() {
                Reply::Silent
            } else {
                Reply::Text(format!("unknown command: {}\n{}", line, HELP))
            }
        }
    }
}

fn submit_device(session: &SessionController, raw: &str) -> Reply {
    match session.submit_device_index(raw) {
        Ok(()) => Reply::Silent,
        // Already shown through the validation notice event.
        Err(DomainError::InvalidDeviceIndex { .. }) => Reply::Silent,
        Err(e) => Reply::Text(e.to_string()),
    }
}
