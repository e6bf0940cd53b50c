use paperpub::app::App;
use paperpub::clipboard::{Clipboard, NoClipboard, SystemClipboard};
use paperpub::console::SettingsPanel;
use paperpub::notify::{ConsoleNotifier, StatusBar};
use paperpub::paper::{Endpoints, Publisher, ReqwestTransport, SharedUrl};
use paperpub::settings::{SettingField, Settings, SettingsStore, TomlFileRepository};
use paperpub::vault::Vault;

use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
enum SettingsCmd {
    ///Shows the current settings
    Show {
        #[structopt(long, help = "print the credential in clear text")]
        reveal: bool,
    },
    ///Changes a setting (credential | path-prefix) and saves it
    Set { field: SettingField, value: String },
    ///Prints the location of the settings file
    Path,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    ///Publishes a note to Dropbox Paper and prints its shared link
    Publish {
        //positional param, relative to the vault
        note: Option<PathBuf>,
        #[structopt(
            short,
            long,
            help = "vault directory or URL. Defaults to the current directory"
        )]
        vault: Option<String>,
        #[structopt(
            long,
            parse(try_from_str = humantime::parse_duration),
            default_value = "3s",
            help = "how long the 'Published' status is shown"
        )]
        status_delay: Duration,
        #[structopt(long, help = "wait for the status to revert before exiting")]
        linger: bool,
        #[structopt(long, help = "do not copy the link to the clipboard")]
        no_clipboard: bool,
        #[structopt(long, default_value = "https://api.dropboxapi.com")]
        api_base: String,
    },
    ///Shows or edits the publishing settings
    Settings {
        #[structopt(subcommand)]
        cmd: SettingsCmd,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(name = "paperpub", about = "Publish markdown notes to Dropbox Paper")]
struct Opt {
    /// Settings file
    #[structopt(short, long, parse(from_os_str))]
    settings_path: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Cmd,
}

struct PublishOpts<'a> {
    settings: &'a Settings,
    note: Option<&'a Path>,
    status_delay: Duration,
    linger: bool,
}

fn publish_note<C: Clipboard>(
    publisher: Publisher<ReqwestTransport>,
    vault: Vault,
    clipboard: C,
    opts: PublishOpts,
) -> Option<SharedUrl> {
    let mut app = App::new(
        publisher,
        vault,
        ConsoleNotifier::stderr(),
        clipboard,
        StatusBar::stderr().shared(),
        opts.status_delay,
    );
    let published = app.publish(opts.settings, opts.note);
    if opts.linger {
        app.settle();
    }
    app.shutdown();
    published.ok()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let repository = match opt.settings_path {
        Some(path) => TomlFileRepository::new(path),
        None => TomlFileRepository::in_config_dir()?,
    };
    let location = repository.path().to_owned();
    let mut store = SettingsStore::load(repository)?;

    match opt.cmd {
        Cmd::Publish {
            note,
            vault,
            status_delay,
            linger,
            no_clipboard,
            api_base,
        } => {
            let vault = match vault {
                Some(location) => Vault::from_location(&location),
                None => Vault::current_dir()?,
            };
            let publisher =
                Publisher::new(ReqwestTransport::new(), Endpoints::with_base(&api_base));
            let opts = PublishOpts {
                settings: store.settings(),
                note: note.as_deref(),
                status_delay,
                linger,
            };
            let published = if no_clipboard {
                publish_note(publisher, vault, NoClipboard, opts)
            } else {
                publish_note(publisher, vault, SystemClipboard, opts)
            };

            match published {
                Some(url) => {
                    println!("{}", url);
                    Ok(())
                }
                // the notice already told the user what went wrong
                None => std::process::exit(1),
            }
        }
        Cmd::Settings { cmd } => match cmd {
            SettingsCmd::Show { reveal } => {
                SettingsPanel::stdout(reveal).render(store.settings(), &location)
            }
            SettingsCmd::Set { field, value } => {
                store.update(field, &value)?;
                info!("{:?} updated in {}", field, location.display());
                Ok(())
            }
            SettingsCmd::Path => {
                println!("{}", location.display());
                Ok(())
            }
        },
    }
}
