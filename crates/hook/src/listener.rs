//! Unix socket the supervisor connects to
//!
//! The socket lives in a directory shared with the supervisor. A stale
//! socket left by a previous run is replaced; a live one or a non-socket file
//! at the same path is refused. The file is removed again when the
//! [`SocketGuard`] is dropped.

use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error(
        "socket directory {path} does not exist (is the hook sockets volume mounted?)"
    )]
    MissingDirectory { path: String },

    #[error("{path} exists and is not a socket")]
    NotSocket { path: String },

    #[error("another process is already listening on {path}")]
    InUse { path: String },

    #[error("failed to inspect {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove stale socket {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Removes the socket file when dropped
#[derive(Debug)]
pub struct SocketGuard {
    path: PathBuf,
}

impl SocketGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed socket {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove socket {}: {}", self.path.display(), e),
        }
    }
}

/// Bind the hook socket at `path`
///
/// Must be called from within a tokio runtime.
pub fn bind_hook_socket(path: &Path) -> Result<(UnixListener, SocketGuard), ListenerError> {
    let shown = path.display().to_string();

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if !dir.is_dir() {
            return Err(ListenerError::MissingDirectory {
                path: dir.display().to_string(),
            });
        }
    }

    if path.exists() {
        remove_stale_socket(path)?;
    }

    let listener = UnixListener::bind(path).map_err(|source| ListenerError::Bind {
        path: shown.clone(),
        source,
    })?;

    info!("Listening on {}", shown);
    Ok((
        listener,
        SocketGuard {
            path: path.to_path_buf(),
        },
    ))
}

fn remove_stale_socket(path: &Path) -> Result<(), ListenerError> {
    let shown = path.display().to_string();

    let metadata = fs::symlink_metadata(path).map_err(|source| ListenerError::Metadata {
        path: shown.clone(),
        source,
    })?;
    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotSocket { path: shown });
    }

    match UnixStream::connect(path) {
        Ok(_stream) => Err(ListenerError::InUse { path: shown }),
        Err(e)
            if e.kind() == io::ErrorKind::ConnectionRefused
                || e.kind() == io::ErrorKind::NotFound =>
        {
            warn!("Removing stale socket {}", shown);
            fs::remove_file(path).map_err(|source| ListenerError::Cleanup {
                path: shown,
                source,
            })
        }
        Err(source) => Err(ListenerError::Metadata {
            path: shown,
            source,
        }),
    }
}
