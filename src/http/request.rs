//! Operations a probe can perform and their request bodies.

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use url::Url;

use crate::http::error::ProbeError;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// How a successful response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// The single logical request of a run.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Plain GET.
    Get { url: Url, format: ResponseFormat },
    /// Multipart POST of one file under [`UPLOAD_FIELD`].
    Upload { url: Url, path: PathBuf },
}

impl Operation {
    pub fn get(url: Url) -> Self {
        Operation::Get {
            url,
            format: ResponseFormat::Text,
        }
    }

    pub fn get_json(url: Url) -> Self {
        Operation::Get {
            url,
            format: ResponseFormat::Json,
        }
    }

    pub fn upload(url: Url, path: impl Into<PathBuf>) -> Self {
        Operation::Upload {
            url,
            path: path.into(),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::Get { .. } => Method::GET,
            Operation::Upload { .. } => Method::POST,
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            Operation::Get { url, .. } | Operation::Upload { url, .. } => url,
        }
    }

    pub fn format(&self) -> ResponseFormat {
        match self {
            Operation::Get { format, .. } => *format,
            Operation::Upload { .. } => ResponseFormat::Text,
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Operation::Upload { .. })
    }

    /// Read whatever the request needs from disk.
    ///
    /// The file is opened, read, and closed before this returns, so no
    /// handle outlives the call on any path.
    pub(crate) async fn load_payload(&self) -> Result<Payload, ProbeError> {
        match self {
            Operation::Get { .. } => Ok(Payload::Empty),
            Operation::Upload { path, .. } => {
                let contents = tokio::fs::read(path).await.map_err(|source| ProbeError::File {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!(path = %path.display(), bytes = contents.len(), "Upload file loaded");
                Ok(Payload::File {
                    file_name: upload_file_name(path),
                    contents,
                })
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Get { url, .. } => write!(f, "GET {}", url),
            Operation::Upload { url, path } => write!(f, "upload of {} to {}", path.display(), url),
        }
    }
}

/// Request body, kept in memory so every attempt sends identical bytes.
#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Empty,
    File { file_name: String, contents: Vec<u8> },
}

impl Payload {
    pub(crate) fn len(&self) -> usize {
        match self {
            Payload::Empty => 0,
            Payload::File { contents, .. } => contents.len(),
        }
    }

    /// Attach this payload to a request for one attempt.
    pub(crate) fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Payload::Empty => builder,
            Payload::File { file_name, contents } => {
                let part = Part::bytes(contents.clone()).file_name(file_name.clone());
                builder.multipart(Form::new().part(UPLOAD_FIELD, part))
            }
        }
    }
}

fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UPLOAD_FIELD.to_string())
}
