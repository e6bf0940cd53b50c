use crate::settings::Settings;
use colored::Colorize;
use io::Result;
use std::{io, path::Path};

const INDENT_STR: &str = " ";
const HEADING: &str = "Publish notes to Dropbox Paper";
pub const CREDENTIAL_HELP_URL: &str =
    "https://help.displayr.com/hc/en-us/articles/360004116315-How-to-Create-an-Access-Token-for-Dropbox";

pub trait ConsoleDisplay {
    fn display(&self, f: &mut Box<dyn io::Write>, depth: usize) -> Result<()>;
}

struct Field<'a> {
    name: &'a str,
    key: &'a str,
    description: &'a str,
    value: String,
    placeholder: &'a str,
}

impl<'a> ConsoleDisplay for Field<'a> {
    fn display(&self, f: &mut Box<dyn io::Write>, depth: usize) -> Result<()> {
        writeln!(f, "{}{} ({})", INDENT_STR.repeat(depth), self.name.bold(), self.key)?;
        writeln!(f, "{}{}", INDENT_STR.repeat(depth + 2), self.description.dimmed())?;
        if self.value.is_empty() {
            writeln!(
                f,
                "{}> {}",
                INDENT_STR.repeat(depth + 2),
                self.placeholder.italic().dimmed()
            )
        } else {
            writeln!(f, "{}> {}", INDENT_STR.repeat(depth + 2), self.value)
        }
    }
}

fn mask(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 4 {
        "*".repeat(chars.len())
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(8), tail)
    }
}

/// Renders the two editable settings with a pointer to credential help.
pub struct SettingsPanel {
    reveal: bool,
    sink: Box<dyn io::Write>,
}

impl SettingsPanel {
    fn sink_to(reveal: bool, sink: Box<dyn io::Write>) -> Self {
        SettingsPanel { reveal, sink }
    }

    pub fn stdout(reveal: bool) -> Self {
        SettingsPanel::sink_to(reveal, Box::new(io::stdout()))
    }

    pub fn render(&mut self, settings: &Settings, location: &Path) -> anyhow::Result<()> {
        let credential = if self.reveal {
            settings.credential.clone()
        } else {
            mask(&settings.credential)
        };
        let fields = [
            Field {
                name: "API Key",
                key: "credential",
                description: "Dropbox access token used to create Paper documents",
                value: credential,
                placeholder: "Enter your secret key here",
            },
            Field {
                name: "Paper directory path",
                key: "path-prefix",
                description: "Directory where published notes are saved",
                value: settings.path_prefix.clone(),
                placeholder: "/paper/",
            },
        ];

        writeln!(self.sink, "{}", HEADING.bold().underline())?;
        writeln!(
            self.sink,
            "How to get a Dropbox access token: {}",
            CREDENTIAL_HELP_URL.blue()
        )?;
        writeln!(self.sink, "Stored in {}", location.display())?;
        writeln!(self.sink)?;
        for field in &fields {
            field.display(&mut self.sink, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate pretty_assertions;

    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    struct Shared(Arc<Mutex<Vec<u8>>>);
    impl io::Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn render(settings: &Settings, reveal: bool) -> String {
        colored::control::set_override(false);
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut panel = SettingsPanel::sink_to(reveal, Box::new(Shared(buffer.clone())));
        panel
            .render(settings, Path::new("/home/me/.config/paperpub/settings.toml"))
            .unwrap();
        let out = buffer.lock().unwrap().clone();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn mask_keeps_last_four_chars() {
        assert_eq!(mask("sl.ABCDEFGH"), "********EFGH");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn render_masked_panel() {
        let settings = Settings {
            credential: "sl.ABCDEFGH".to_owned(),
            path_prefix: "/paper/".to_owned(),
        };
        let expected = format!(
            "{}\nHow to get a Dropbox access token: {}\nStored in /home/me/.config/paperpub/settings.toml\n\n\
API Key (credential)\n  Dropbox access token used to create Paper documents\n  > ********EFGH\n\
Paper directory path (path-prefix)\n  Directory where published notes are saved\n  > /paper/\n",
            HEADING, CREDENTIAL_HELP_URL
        );
        assert_eq!(render(&settings, false), expected);
    }

    #[test]
    fn render_placeholder_for_empty_values() {
        let settings = Settings {
            credential: "sl.ABCDEFGH".to_owned(),
            path_prefix: "".to_owned(),
        };
        let rendered = render(&settings, true);
        assert!(rendered.contains("> sl.ABCDEFGH\n"));
        assert!(rendered.ends_with("  > /paper/\n"));
    }
}
