//! Shader source retrieval for wireshade.
//!
//! A [`SourceHandle`] names where one shader stage's text lives: an absolute
//! URL, or a relative identifier that either joins a configured base URL or
//! resolves as a local file. [`SourceClient`] performs the actual retrieval
//! and [`resolve_pair`] sequences the two stage fetches so the fragment
//! source is never requested before the vertex source has arrived.

mod client;

pub use client::{resolve_pair, FetchConfig, FetchError, ShaderPair, SourceClient};

use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline stage a fetched source is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Location of one shader stage's source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceHandle {
    /// Absolute `http(s)://` location fetched over the network.
    Url(String),
    /// Filesystem path, or a relative identifier joined onto a base URL.
    Path(PathBuf),
}

impl SourceHandle {
    pub fn from_input(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::Path(PathBuf::from(input))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    pub fn as_local_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path.as_path()),
            _ => None,
        }
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceHandle::Url(url) => f.write_str(url),
            SourceHandle::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_url() {
        assert_eq!(
            SourceHandle::from_input("https://example.com/quad.frag"),
            SourceHandle::Url("https://example.com/quad.frag".into())
        );
        assert!(SourceHandle::from_input("http://localhost/quad.vert").is_remote());
    }

    #[test]
    fn parses_local_path() {
        assert!(matches!(
            SourceHandle::from_input("shaders/vertexShader.glsl"),
            SourceHandle::Path(path) if path == PathBuf::from("shaders/vertexShader.glsl")
        ));
    }

    #[test]
    fn stage_labels_match_pipeline_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
