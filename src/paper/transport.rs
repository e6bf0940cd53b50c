use super::Result;
use log::{debug, warn};
use std::io::Read;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const DROPBOX_API_ARG: &str = "Dropbox-API-Arg";

#[derive(PartialEq, Debug, Clone)]
pub struct ApiRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn new(url: &str, credential: &str, content_type: &str, body: Vec<u8>) -> Self {
        ApiRequest {
            url: url.to_owned(),
            headers: vec![
                (AUTHORIZATION.to_owned(), format!("Bearer {}", credential)),
                (CONTENT_TYPE.to_owned(), content_type.to_owned()),
            ],
            body,
        }
    }

    pub fn with_header(mut self, name: &str, value: String) -> Self {
        self.headers.push((name.to_owned(), value));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ApiReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single POST request and hands back the raw reply.
///
/// Non-2xx statuses are not errors at this level: Dropbox describes
/// application failures in a JSON body, which the publisher inspects.
pub trait Transport {
    fn post(&self, request: ApiRequest) -> Result<ApiReply>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        ReqwestTransport::new()
    }
}

impl Transport for ReqwestTransport {
    fn post(&self, request: ApiRequest) -> Result<ApiReply> {
        debug!("POST {} ({} bytes)", &request.url, request.body.len());
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut resp = builder.body(request.body).send()?;

        let status = resp.status();
        let mut body: Vec<u8> = Vec::new();
        resp.read_to_end(&mut body)?;

        if !status.is_success() {
            warn!(
                "Server responded with non-successful status code {}: {}",
                status,
                String::from_utf8_lossy(&body)
            );
        }
        Ok(ApiReply {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_bearer_and_content_type() {
        let request = ApiRequest::new(
            "https://api.dropboxapi.com/2/files/paper/create",
            "s3cr3t",
            "application/octet-stream",
            b"# notes".to_vec(),
        )
        .with_header(DROPBOX_API_ARG, "{}".to_owned());

        assert_eq!(request.header("authorization"), Some("Bearer s3cr3t"));
        assert_eq!(
            request.header(CONTENT_TYPE),
            Some("application/octet-stream")
        );
        assert_eq!(request.header(DROPBOX_API_ARG), Some("{}"));
        assert_eq!(request.header("X-Missing"), None);
    }

    #[test]
    fn reply_success_range() {
        let ok = ApiReply {
            status: 200,
            body: vec![],
        };
        let conflict = ApiReply {
            status: 409,
            body: vec![],
        };
        assert!(ok.is_success());
        assert!(!conflict.is_success());
    }
}
