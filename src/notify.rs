use anyhow::Result;
use atty::Stream;
use colored::Colorize;
use log::debug;
use std::{
    io,
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Duration,
};

const CLEAR_LINE: &str = "\r\x1b[2K";

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }
}

/// Transient messages shown to the user.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice) -> Result<()>;
}

pub struct ConsoleNotifier {
    sink: Box<dyn io::Write>,
}
impl ConsoleNotifier {
    pub(crate) fn sink_to(sink: Box<dyn io::Write>) -> Self {
        ConsoleNotifier { sink }
    }

    pub fn stderr() -> Self {
        ConsoleNotifier::sink_to(Box::new(io::stderr()))
    }
}
impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: &Notice) -> Result<()> {
        match notice {
            Notice::Info(text) => writeln!(self.sink, "{}", text.green())?,
            Notice::Error(text) => writeln!(self.sink, "{}", text.red())?,
        }
        Ok(())
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Status {
    Idle,
    Publishing,
    Published,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => "Publish to Paper",
            Status::Publishing => "Publishing...",
            Status::Published => "Published",
        }
    }
}

/// Single line of status text. On a terminal the line is rewritten in place,
/// otherwise every change is printed on its own line.
pub struct StatusBar {
    current: Status,
    generation: u64,
    in_place: bool,
    sink: Box<dyn io::Write + Send>,
}

pub type SharedStatusBar = Arc<Mutex<StatusBar>>;

impl StatusBar {
    pub(crate) fn sink_to(sink: Box<dyn io::Write + Send>, in_place: bool) -> Self {
        StatusBar {
            current: Status::Idle,
            generation: 0,
            in_place,
            sink,
        }
    }

    pub fn stderr() -> Self {
        StatusBar::sink_to(Box::new(io::stderr()), atty::is(Stream::Stderr))
    }

    pub fn hidden() -> Self {
        StatusBar::sink_to(Box::new(io::sink()), false)
    }

    pub fn shared(self) -> SharedStatusBar {
        Arc::new(Mutex::new(self))
    }

    pub fn current(&self) -> Status {
        self.current
    }

    pub fn set(&mut self, status: Status) {
        self.current = status;
        self.generation += 1;
        let written = if self.in_place {
            self.redraw()
        } else {
            writeln!(self.sink, "{}", status.label().bold())
        };
        if let Err(e) = written {
            debug!("Couldn't render status '{}': {}", status.label(), e);
        }
    }

    fn redraw(&mut self) -> io::Result<()> {
        write!(self.sink, "{}{}", CLEAR_LINE, self.current.label().bold())?;
        self.sink.flush()
    }

    /// Runs `print` on a blank line, then draws the status again below it.
    /// Anything else printing to the same stream should go through here.
    pub fn interrupt<F, R>(&mut self, print: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.in_place {
            return print();
        }
        let _ = write!(self.sink, "{}", CLEAR_LINE).and_then(|_| self.sink.flush());
        let result = print();
        if let Err(e) = self.redraw() {
            debug!("Couldn't redraw status: {}", e);
        }
        result
    }

    /// Leaves the cursor on a fresh line.
    pub fn finish(&mut self) {
        if self.in_place {
            let _ = writeln!(self.sink);
        }
    }
}

/// Puts the status back to idle once `delay` has elapsed, unless cancelled
/// first or the status changed again in the meantime.
pub struct ScheduledReset {
    cancel: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ScheduledReset {
    pub fn after(status_bar: SharedStatusBar, delay: Duration) -> Self {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let generation = status_bar.lock().map(|bar| bar.generation).unwrap_or(0);
        let handle = thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = cancelled.recv_timeout(delay) {
                if let Ok(mut bar) = status_bar.lock() {
                    if bar.generation == generation {
                        bar.set(Status::Idle);
                    }
                }
            }
        });
        ScheduledReset {
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    /// Blocks until the reset fired.
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn cancel(self) {
        drop(self)
    }
}

impl Drop for ScheduledReset {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Instant;

    /// In-memory stream that can be handed to several writers at once.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }

        /// What a terminal shows: each `\r` returns to column 0 and the
        /// clear-line sequence wipes what was there.
        pub fn visible_lines(&self) -> Vec<String> {
            self.contents()
                .split('\n')
                .map(|line| {
                    line.rsplit('\r')
                        .next()
                        .unwrap_or("")
                        .replace("\x1b[2K", "")
                })
                .collect()
        }
    }

    #[test]
    fn render_status_changes_line_by_line() {
        let buffer = SharedBuffer::default();
        colored::control::set_override(false);
        let mut bar = StatusBar::sink_to(Box::new(buffer.clone()), false);
        bar.set(Status::Publishing);
        bar.set(Status::Published);

        assert_eq!(buffer.contents(), "Publishing...\nPublished\n");
        assert_eq!(bar.current(), Status::Published);
    }

    #[test]
    fn notice_gets_its_own_line_on_a_terminal() {
        let buffer = SharedBuffer::default();
        colored::control::set_override(false);
        let mut bar = StatusBar::sink_to(Box::new(buffer.clone()), true);
        let mut notifier = ConsoleNotifier::sink_to(Box::new(buffer.clone()));

        bar.set(Status::Publishing);
        bar.set(Status::Idle);
        bar.interrupt(|| notifier.notify(&Notice::Error("Error: path/conflict".to_owned())))
            .unwrap();

        assert_eq!(
            buffer.visible_lines(),
            vec!["Error: path/conflict".to_owned(), "Publish to Paper".to_owned()]
        );
    }

    #[test]
    fn interrupt_off_terminal_just_writes() {
        let buffer = SharedBuffer::default();
        colored::control::set_override(false);
        let mut bar = StatusBar::sink_to(Box::new(buffer.clone()), false);
        let mut notifier = ConsoleNotifier::sink_to(Box::new(buffer.clone()));

        bar.set(Status::Published);
        bar.interrupt(|| notifier.notify(&Notice::Info("done".to_owned())))
            .unwrap();

        assert_eq!(buffer.contents(), "Published\ndone\n");
    }

    #[test]
    fn reset_fires_after_delay() {
        let bar = StatusBar::hidden().shared();
        bar.lock().unwrap().set(Status::Published);

        let started = Instant::now();
        ScheduledReset::after(bar.clone(), Duration::from_millis(20)).wait();

        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(bar.lock().unwrap().current(), Status::Idle);
    }

    #[test]
    fn cancelled_reset_never_fires() {
        let bar = StatusBar::hidden().shared();
        bar.lock().unwrap().set(Status::Published);

        ScheduledReset::after(bar.clone(), Duration::from_secs(60)).cancel();

        assert_eq!(bar.lock().unwrap().current(), Status::Published);
    }

    #[test]
    fn newer_status_supersedes_reset() {
        let bar = StatusBar::hidden().shared();
        bar.lock().unwrap().set(Status::Published);
        let reset = ScheduledReset::after(bar.clone(), Duration::from_millis(20));
        bar.lock().unwrap().set(Status::Publishing);

        reset.wait();

        assert_eq!(bar.lock().unwrap().current(), Status::Publishing);
    }

    #[test]
    fn notice_text() {
        assert_eq!(Notice::Error("Error: boom".to_owned()).text(), "Error: boom");
    }
}
