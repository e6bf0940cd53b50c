//! Top-level publish command: checks settings, resolves the note, runs the
//! publisher and reports the outcome through notices and the status bar.

use crate::{
    clipboard::Clipboard,
    notify::{Notice, Notifier, ScheduledReset, SharedStatusBar, Status},
    paper::{PaperError, Publisher, SharedUrl, Transport},
    settings::Settings,
    vault::{Vault, VaultError},
};
use log::{debug, info, warn};
use std::{path::Path, time::Duration};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please set your API key and prefix path in the settings.")]
    MissingSettings,
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Publish(#[from] PaperError),
}

impl AppError {
    fn notice(&self) -> Notice {
        match self {
            AppError::Publish(e) => Notice::Error(format!("Error: {}", e)),
            other => Notice::Error(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

pub struct App<T: Transport, N: Notifier, C: Clipboard> {
    publisher: Publisher<T>,
    vault: Vault,
    notifier: N,
    clipboard: C,
    status_bar: SharedStatusBar,
    reset_delay: Duration,
    pending_reset: Option<ScheduledReset>,
}

impl<T: Transport, N: Notifier, C: Clipboard> App<T, N, C> {
    pub fn new(
        publisher: Publisher<T>,
        vault: Vault,
        notifier: N,
        clipboard: C,
        status_bar: SharedStatusBar,
        reset_delay: Duration,
    ) -> Self {
        let app = App {
            publisher,
            vault,
            notifier,
            clipboard,
            status_bar,
            reset_delay,
            pending_reset: None,
        };
        app.set_status(Status::Idle);
        app
    }

    /// Never panics on failure: every error ends up as a notice, and the
    /// status goes back to idle.
    pub fn publish<P: AsRef<Path>>(
        &mut self,
        settings: &Settings,
        note: Option<P>,
    ) -> Result<SharedUrl> {
        match self.try_publish(settings, note) {
            Ok(url) => {
                self.set_status(Status::Published);
                let notice = match self.clipboard.copy(&url.0) {
                    Ok(true) => format!("Published to Paper: {} copied to clipboard.", url),
                    Ok(false) => {
                        debug!("Clipboard disabled, not copying {}", url);
                        format!("Published to Paper: {}", url)
                    }
                    Err(e) => {
                        warn!("Couldn't copy {} to the clipboard: {}", url, e);
                        format!("Published to Paper: {}", url)
                    }
                };
                self.show(Notice::Info(notice));
                self.pending_reset = Some(ScheduledReset::after(
                    self.status_bar.clone(),
                    self.reset_delay,
                ));
                Ok(url)
            }
            Err(e) => {
                self.set_status(Status::Idle);
                self.show(e.notice());
                Err(e)
            }
        }
    }

    fn try_publish<P: AsRef<Path>>(
        &mut self,
        settings: &Settings,
        note: Option<P>,
    ) -> Result<SharedUrl> {
        if !settings.is_complete() {
            return Err(AppError::MissingSettings);
        }
        let absolute_path = self.vault.absolute_path(note)?;

        // A reset still pending from an earlier publish must not clobber this one.
        self.pending_reset.take();
        self.set_status(Status::Publishing);

        let url = self.publisher.publish(
            &absolute_path,
            &settings.credential,
            &settings.path_prefix,
        )?;
        info!("{} published at {}", absolute_path.display(), url);
        Ok(url)
    }

    fn set_status(&self, status: Status) {
        if let Ok(mut bar) = self.status_bar.lock() {
            bar.set(status);
        }
    }

    fn show(&mut self, notice: Notice) {
        let notifier = &mut self.notifier;
        let shown = match self.status_bar.lock() {
            Ok(mut bar) => bar.interrupt(|| notifier.notify(&notice)),
            Err(_) => notifier.notify(&notice),
        };
        if let Err(e) = shown {
            warn!("Couldn't show notice '{}': {}", notice.text(), e);
        }
    }

    /// Blocks until a pending status reset has fired.
    pub fn settle(&mut self) {
        if let Some(reset) = self.pending_reset.take() {
            reset.wait();
        }
    }

    /// Cancels any pending status reset.
    pub fn shutdown(mut self) {
        self.pending_reset.take();
        if let Ok(mut bar) = self.status_bar.lock() {
            bar.finish();
        }
    }
}
