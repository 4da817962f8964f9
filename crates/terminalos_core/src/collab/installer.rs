//! Package installer collaborator.

use log::{info, warn};
use std::io;
use std::process::Command;

/// Captured result of one install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Installs one package by name.
pub trait PackageInstaller {
    /// Runs the installer to completion.
    ///
    /// # Errors
    /// - The installer process could not be spawned or awaited.
    fn install(&self, package: &str) -> io::Result<InstallOutput>;
}

/// Runs `<python> -m pip install <package>`.
pub struct PipInstaller {
    python: String,
}

impl PipInstaller {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

impl PackageInstaller for PipInstaller {
    fn install(&self, package: &str) -> io::Result<InstallOutput> {
        info!(
            "event=package_install module=collab status=start python={}",
            self.python
        );
        let output = Command::new(&self.python)
            .args(["-m", "pip", "install", package])
            .output()
            .map_err(|err| {
                warn!("event=package_install module=collab status=error error={err}");
                err
            })?;

        let result = InstallOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        info!(
            "event=package_install module=collab status={} exit_code={}",
            if result.success { "ok" } else { "error" },
            output.status.code().unwrap_or(-1)
        );
        Ok(result)
    }
}
