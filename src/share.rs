//! Handing export documents to the platform.
//!
//! When no share mechanism is available (or it fails) the document is not
//! lost: its path is surfaced to the user instead.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::maps::UrlOpener;
use crate::platform::{self, Platform};

pub const JSON_MIME: &str = "application/json";

pub trait ShareSink {
    fn is_available(&self) -> bool;
    fn share(&self, path: &Path, mime: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// Not shared; show this path to the user.
    Surfaced(PathBuf),
}

pub fn share_or_surface(sink: &dyn ShareSink, path: &Path, mime: &str) -> ShareOutcome {
    if !sink.is_available() {
        tracing::debug!(path = %path.display(), "share unavailable, surfacing path");
        return ShareOutcome::Surfaced(path.to_path_buf());
    }

    match sink.share(path, mime) {
        Ok(()) => ShareOutcome::Shared,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "share failed, surfacing path");
            ShareOutcome::Surfaced(path.to_path_buf())
        }
    }
}

/// Sink that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShare;

impl ShareSink for NoShare {
    fn is_available(&self) -> bool {
        false
    }

    fn share(&self, path: &Path, _mime: &str) -> Result<()> {
        Err(Error::ShareUnavailable(path.to_path_buf()))
    }
}

/// Delegates to the desktop opener (`open`, `xdg-open`, `start`).
#[derive(Debug, Clone, Copy)]
pub struct SystemOpener {
    platform: Platform,
}

impl SystemOpener {
    pub fn new(platform: Platform) -> Self {
        SystemOpener { platform }
    }

    fn launch(&self, target: &str) -> std::io::Result<()> {
        let Some(argv) = platform::opener_argv(self.platform, target) else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "no opener on this platform",
            ));
        };

        let program = &argv[0];
        let status = Command::new(program).args(&argv[1..]).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!("{program} exited with {status}")))
        }
    }
}

impl ShareSink for SystemOpener {
    fn is_available(&self) -> bool {
        platform::opener_available(self.platform)
    }

    fn share(&self, path: &Path, mime: &str) -> Result<()> {
        tracing::debug!(path = %path.display(), mime, "opening export document");
        self.launch(&path.to_string_lossy())
            .map_err(|_| Error::ShareUnavailable(path.to_path_buf()))
    }
}

impl UrlOpener for SystemOpener {
    fn can_open(&self, url: &str) -> bool {
        platform::handles_scheme(self.platform, url) && platform::opener_available(self.platform)
    }

    fn open(&self, url: &str) -> Result<()> {
        self.launch(url).map_err(Error::Io)
    }
}
