pub mod publisher;
pub mod transport;

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

pub use publisher::Publisher;
pub use transport::{ApiReply, ApiRequest, ReqwestTransport, Transport};

pub const PAPER_SUFFIX: &str = ".paper";
pub const IMPORT_FORMAT_MARKDOWN: &str = "markdown";

#[derive(Error, Debug)]
pub enum PaperError {
    #[error("{0}")]
    Remote(String),
    #[error("No shareable link returned for {0}")]
    NoSharedLink(String),
    #[error("Cannot determine the file name of {0}")]
    NoFileName(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected response from Dropbox: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Dropbox answered HTTP {0} without a readable body: {1}")]
    Status(u16, #[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PaperError>;

#[derive(PartialEq, Eq, Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SharedUrl(pub String);

impl Display for SharedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dropbox API endpoints used by the publisher.
#[derive(PartialEq, Debug, Clone)]
pub struct Endpoints {
    pub paper_create: String,
    pub list_shared_links: String,
}

impl Endpoints {
    pub fn with_base(api_base: &str) -> Self {
        let api_base = api_base.trim_end_matches('/');
        Endpoints {
            paper_create: format!("{}/2/files/paper/create", api_base),
            list_shared_links: format!("{}/2/sharing/list_shared_links", api_base),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints::with_base("https://api.dropboxapi.com")
    }
}

/// Sent JSON-encoded in the `Dropbox-API-Arg` header of the create call.
#[derive(PartialEq, Debug, Serialize)]
pub(crate) struct CreateArg<'a> {
    pub path: &'a str,
    pub import_format: &'a str,
}

#[derive(PartialEq, Debug, Deserialize)]
pub(crate) struct CreateResult {
    pub result_path: String,
}

#[derive(PartialEq, Debug, Serialize)]
pub(crate) struct ListSharedLinksArg<'a> {
    pub path: &'a str,
    pub direct_only: bool,
}

#[derive(PartialEq, Debug, Deserialize)]
pub(crate) struct ListSharedLinksResult {
    #[serde(default)]
    pub links: Vec<SharedLink>,
}

#[derive(PartialEq, Debug, Deserialize)]
pub(crate) struct SharedLink {
    pub url: SharedUrl,
}

/// Joins `prefix` and `file_name` + `.paper` into a normalized absolute path.
pub fn build_path(prefix: &str, file_name: &str) -> String {
    let document = format!("{}{}", file_name, PAPER_SUFFIX);
    let mut segments: Vec<&str> = Vec::new();
    for segment in prefix.split('/').chain(document.split('/')) {
        match segment {
            "" | "." => (),
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
