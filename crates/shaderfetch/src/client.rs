use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use tracing::debug;

use crate::{ShaderStage, SourceHandle};

/// Typed failure raised while retrieving a shader source.
///
/// `Status` mirrors the transport's status line so callers can surface the
/// exact response description; the remaining variants wrap the underlying
/// transport or filesystem error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{stage} shader request for '{identifier}' returned {status}")]
    Status {
        stage: ShaderStage,
        identifier: String,
        status: String,
    },
    #[error("{stage} shader request for '{identifier}' failed")]
    Transport {
        stage: ShaderStage,
        identifier: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read {stage} shader at {path}")]
    Io {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot join {stage} shader '{identifier}' onto base url '{base}'")]
    Join {
        stage: ShaderStage,
        identifier: String,
        base: String,
    },
}

/// How relative source identifiers should be resolved.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// When set, relative identifiers are fetched from this location instead
    /// of the local filesystem.
    pub base_url: Option<Url>,
}

impl FetchConfig {
    /// Validates the optional base URL.
    ///
    /// A trailing slash is enforced so joining keeps the final path segment
    /// instead of replacing it.
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let base_url = match base_url {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    bail!("base url must not be empty");
                }
                let mut normalized = trimmed.to_string();
                if !normalized.ends_with('/') {
                    normalized.push('/');
                }
                Some(
                    Url::parse(&normalized)
                        .with_context(|| format!("invalid base url '{trimmed}'"))?,
                )
            }
            None => None,
        };
        Ok(Self { base_url })
    }
}

/// Blocking HTTP client plus the resolution rules for relative identifiers.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: Client,
    config: FetchConfig,
}

impl SourceClient {
    pub fn new(config: FetchConfig) -> Result<Self> {
        // No request deadline; a slow host just delays startup.
        let http = Client::builder().timeout(None).build()?;
        Ok(Self { http, config })
    }

    /// Retrieves both stage sources in order, vertex first.
    pub fn fetch_pair(
        &self,
        vertex: &SourceHandle,
        fragment: &SourceHandle,
    ) -> Result<ShaderPair, FetchError> {
        resolve_pair(vertex, fragment, |stage, handle| {
            self.fetch_source(stage, handle)
        })
    }

    /// Retrieves the text behind a single handle.
    pub fn fetch_source(
        &self,
        stage: ShaderStage,
        handle: &SourceHandle,
    ) -> Result<String, FetchError> {
        match handle {
            SourceHandle::Url(url) => self.fetch_remote(stage, url),
            SourceHandle::Path(path) => match self.config.base_url.as_ref() {
                Some(base) => {
                    let url = join_base(base, stage, path)?;
                    self.fetch_remote(stage, url.as_str())
                }
                None => read_local(stage, path),
            },
        }
    }

    fn fetch_remote(&self, stage: ShaderStage, url: &str) -> Result<String, FetchError> {
        debug!(%url, stage = %stage, "requesting shader source");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|source| FetchError::Transport {
                stage,
                identifier: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                stage,
                identifier: url.to_string(),
                status: status.to_string(),
            });
        }
        response.text().map_err(|source| FetchError::Transport {
            stage,
            identifier: url.to_string(),
            source,
        })
    }
}

fn join_base(base: &Url, stage: ShaderStage, path: &Path) -> Result<Url, FetchError> {
    let identifier = path.to_string_lossy();
    base.join(identifier.as_ref())
        .map_err(|_| FetchError::Join {
            stage,
            identifier: identifier.into_owned(),
            base: base.to_string(),
        })
}

fn read_local(stage: ShaderStage, path: &Path) -> Result<String, FetchError> {
    debug!(path = %path.display(), stage = %stage, "reading shader source");
    fs::read_to_string(path).map_err(|source| FetchError::Io {
        stage,
        path: path.to_path_buf(),
        source,
    })
}

/// Bundle of both stage sources, fetched in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPair {
    pub vertex: String,
    pub fragment: String,
}

/// Retrieves the vertex and fragment sources sequentially.
///
/// The fragment fetch does not begin until the vertex fetch has completed,
/// and the first failure short-circuits the pair. `fetch_source` is
/// injected so callers can decide how a handle turns into text.
pub fn resolve_pair<F>(
    vertex: &SourceHandle,
    fragment: &SourceHandle,
    mut fetch_source: F,
) -> Result<ShaderPair, FetchError>
where
    F: FnMut(ShaderStage, &SourceHandle) -> Result<String, FetchError>,
{
    let vertex = fetch_source(ShaderStage::Vertex, vertex)?;
    let fragment = fetch_source(ShaderStage::Fragment, fragment)?;
    Ok(ShaderPair { vertex, fragment })
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn resolve_pair_fetches_vertex_then_fragment() {
        let vertex = SourceHandle::from_input("a.vert");
        let fragment = SourceHandle::from_input("a.frag");
        let mut requested = Vec::new();

        let pair = resolve_pair(&vertex, &fragment, |stage, handle| {
            requested.push((stage, handle.clone()));
            Ok(format!("// {stage}"))
        })
        .expect("resolve pair");

        assert_eq!(
            requested,
            vec![
                (ShaderStage::Vertex, vertex.clone()),
                (ShaderStage::Fragment, fragment.clone()),
            ]
        );
        assert_eq!(pair.vertex, "// vertex");
        assert_eq!(pair.fragment, "// fragment");
    }

    #[test]
    fn resolve_pair_short_circuits_on_vertex_failure() {
        let vertex = SourceHandle::from_input("missing.vert");
        let fragment = SourceHandle::from_input("a.frag");
        let mut calls = 0;

        let err = resolve_pair(&vertex, &fragment, |stage, _handle| {
            calls += 1;
            Err(FetchError::Status {
                stage,
                identifier: "missing.vert".into(),
                status: "404 Not Found".into(),
            })
        })
        .unwrap_err();

        assert_eq!(calls, 1);
        assert!(matches!(err, FetchError::Status { stage, .. } if stage == ShaderStage::Vertex));
    }

    #[test]
    fn base_url_joining_keeps_directory_segments() {
        let config = FetchConfig::new(Some("http://example.com/shaders")).expect("config");
        let base = config.base_url.expect("base url");
        assert!(base.as_str().ends_with('/'));

        let url = join_base(&base, ShaderStage::Vertex, Path::new("quad.vert")).expect("join");
        assert_eq!(url.as_str(), "http://example.com/shaders/quad.vert");
    }

    #[test]
    fn rejects_empty_or_invalid_base_url() {
        assert!(FetchConfig::new(Some("   ")).is_err());
        assert!(FetchConfig::new(Some("not a url")).is_err());
        assert!(FetchConfig::new(None).expect("config").base_url.is_none());
    }

    #[test]
    fn local_reads_resolve_paths_against_the_filesystem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("quad.vert");
        fs::write(&path, "void main() {}").expect("write shader");

        let client = SourceClient::new(FetchConfig::new(None).unwrap()).expect("client");
        let handle = SourceHandle::Path(path.clone());
        let source = client
            .fetch_source(ShaderStage::Vertex, &handle)
            .expect("fetch source");
        assert_eq!(source, "void main() {}");

        let missing = SourceHandle::Path(dir.path().join("missing.vert"));
        let err = client
            .fetch_source(ShaderStage::Vertex, &missing)
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[test]
    fn remote_fetch_maps_status_and_success() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = std::thread::spawn(move || {
            for (status, body) in [("404 Not Found", ""), ("200 OK", "void main() {}")] {
                let (mut socket, _) = listener.accept().expect("accept");
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).expect("write response");
            }
        });

        let client = SourceClient::new(FetchConfig::new(None).unwrap()).expect("client");

        let missing = SourceHandle::Url(format!("http://{addr}/missing.glsl"));
        let err = client
            .fetch_source(ShaderStage::Vertex, &missing)
            .unwrap_err();
        match err {
            FetchError::Status { status, .. } => assert!(status.contains("404")),
            other => panic!("expected status error, got {other:?}"),
        }

        let present = SourceHandle::Url(format!("http://{addr}/quad.frag"));
        let body = client
            .fetch_source(ShaderStage::Fragment, &present)
            .expect("fetch body");
        assert_eq!(body, "void main() {}");

        server.join().expect("server thread");
    }
}
