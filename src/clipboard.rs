use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Failed to run {0}: {1}")]
    Spawn(&'static str, #[source] std::io::Error),
    #[error("Failed to write to {0}: {1}")]
    Pipe(&'static str, #[source] std::io::Error),
    #[error("{0} exited with error")]
    Failed(&'static str),
    #[error("Clipboard not supported on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

pub trait Clipboard {
    /// `Ok(false)` when copying is switched off.
    fn copy(&self, text: &str) -> Result<bool>;
}

#[cfg(target_os = "macos")]
const CANDIDATES: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(target_os = "linux")]
const CANDIDATES: &[(&str, &[&str])] = &[
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];
#[cfg(target_os = "windows")]
const CANDIDATES: &[(&str, &[&str])] = &[("clip", &[])];
#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CANDIDATES: &[(&str, &[&str])] = &[];

/// Pipes text into the platform clipboard tool: `pbcopy` on macOS,
/// `xclip` then `xsel` on Linux, `clip` on Windows.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<bool> {
        let mut last_err = ClipboardError::Unsupported;
        for &(program, args) in CANDIDATES {
            match pipe_into(program, args, text) {
                Ok(()) => return Ok(true),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }
}

fn pipe_into(program: &'static str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| ClipboardError::Spawn(program, e))?;

    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };

    // stdin is closed by now, so the child sees EOF and can be reaped
    let status = child
        .wait()
        .map_err(|e| ClipboardError::Spawn(program, e))?;
    written.map_err(|e| ClipboardError::Pipe(program, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::Failed(program))
    }
}

/// Used when `--no-clipboard` is given.
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> Result<bool> {
        Ok(false)
    }
}
