use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

use arboard::Clipboard;
use crossterm::cursor::MoveTo;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppError, Result};

const LOG_ENV: &str = "FILLGO_LOG";

/// Sends tracing output to the log file; the terminal belongs to the UI.
pub(crate) fn init_logging(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent).map_err(|source| AppError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .map_err(|source| AppError::Write {
            path: config.log_file.clone(),
            source,
        })?;
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|err| AppError::Logging(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

/// Lets the user edit `text` in an external editor and returns the result.
pub(crate) fn edit_text(editor: &str, text: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("fillgo-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    run_editor_command(editor, file.path())?;
    let edited = fs::read_to_string(file.path()).map_err(|source| AppError::Read {
        path: file.path().to_path_buf(),
        source,
    })?;
    Ok(edited)
}

pub(crate) fn run_editor_command(editor: &str, path: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| AppError::Editor("editor command is empty".to_string()))?;
    let args: Vec<&str> = parts.collect();
    debug!(command, ?args, path = %path.display(), "launching editor");

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    let status_result = Command::new(command).args(&args).arg(path).status();

    let restore_result = execute!(
        io::stdout(),
        EnterAlternateScreen,
        EnableMouseCapture,
        Clear(ClearType::All),
        MoveTo(0, 0)
    )
    .and_then(|_| enable_raw_mode());

    let status = match status_result {
        Ok(status) => status,
        Err(err) => {
            if let Err(restore) = restore_result {
                warn!(error = %restore, "failed to restore terminal");
            }
            return Err(AppError::Editor(format!("failed to start `{command}`: {err}")));
        }
    };
    restore_result?;
    if !status.success() {
        return Err(AppError::Editor(format!("`{command}` exited with {status}")));
    }
    Ok(())
}

pub(crate) fn set_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    debug!(bytes = text.len(), "copied to clipboard");
    Ok(())
}
