use super::transport::DROPBOX_API_ARG;
use super::{
    build_path, ApiReply, ApiRequest, CreateArg, CreateResult, Endpoints, ListSharedLinksArg,
    ListSharedLinksResult, PaperError, Result, SharedUrl, Transport, IMPORT_FORMAT_MARKDOWN,
};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fs, path::Path};

const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";

pub struct Publisher<T: Transport> {
    transport: T,
    endpoints: Endpoints,
}

/// Fails with the service summary when the body carries an `error` member.
fn parse_reply<R: DeserializeOwned>(reply: &ApiReply) -> Result<R> {
    let value: Value = serde_json::from_slice(&reply.body).map_err(|e| {
        if reply.is_success() {
            PaperError::Json(e)
        } else {
            PaperError::Status(reply.status, e)
        }
    })?;
    match value.get("error") {
        Some(error) if !error.is_null() => {
            let summary = value
                .get("error_summary")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| error.to_string());
            Err(PaperError::Remote(summary))
        }
        _ => Ok(serde_json::from_value(value)?),
    }
}

impl<T: Transport> Publisher<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Publisher {
            transport,
            endpoints,
        }
    }

    pub fn publish<P: AsRef<Path>>(
        &self,
        file_path: P,
        credential: &str,
        path_prefix: &str,
    ) -> Result<SharedUrl> {
        let file_path = file_path.as_ref();
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PaperError::NoFileName(file_path.display().to_string()))?;
        let paper_path = build_path(path_prefix, file_name);
        let content = fs::read(file_path)?;

        info!(
            "Publishing {} ({} bytes) to Paper as {}",
            file_path.display(),
            content.len(),
            &paper_path
        );

        let result_path = self.create(&paper_path, credential, content)?;
        debug!("Paper document created at {}", &result_path);
        self.first_direct_link(&result_path, credential)
    }

    fn create(&self, paper_path: &str, credential: &str, content: Vec<u8>) -> Result<String> {
        let arg = serde_json::to_string(&CreateArg {
            path: paper_path,
            import_format: IMPORT_FORMAT_MARKDOWN,
        })?;
        let request = ApiRequest::new(
            &self.endpoints.paper_create,
            credential,
            OCTET_STREAM,
            content,
        )
        .with_header(DROPBOX_API_ARG, arg);

        let reply = self.transport.post(request)?;
        let created: CreateResult = parse_reply(&reply)?;
        Ok(created.result_path)
    }

    fn first_direct_link(&self, result_path: &str, credential: &str) -> Result<SharedUrl> {
        let body = serde_json::to_vec(&ListSharedLinksArg {
            path: result_path,
            direct_only: true,
        })?;
        let request = ApiRequest::new(&self.endpoints.list_shared_links, credential, JSON, body);

        let reply = self.transport.post(request)?;
        let listed: ListSharedLinksResult = parse_reply(&reply)?;
        listed
            .links
            .into_iter()
            .next()
            .map(|link| link.url)
            .ok_or_else(|| PaperError::NoSharedLink(result_path.to_owned()))
    }
}
