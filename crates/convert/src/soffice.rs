//! LibreOffice conversion strategy.

use std::{path::PathBuf, time::Duration};

use {
    async_trait::async_trait,
    tokio::process::Command,
    tracing::{debug, info},
};

use crate::{
    ConversionJob, Strategy,
    error::{Error, Result},
};

/// Binaries probed for, in preference order.
const BINARY_NAMES: &[&str] = &["soffice", "libreoffice"];

pub struct LibreOfficeStrategy {
    timeout: Duration,
    binary: Option<PathBuf>,
}

impl LibreOfficeStrategy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            binary: None,
        }
    }

    /// Use an explicit converter binary instead of probing the search path.
    pub fn with_binary(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            timeout,
            binary: Some(binary.into()),
        }
    }

    fn binary(&self) -> Option<PathBuf> {
        match &self.binary {
            Some(path) => path.is_file().then(|| path.clone()),
            None => BINARY_NAMES.iter().find_map(|name| which::which(name).ok()),
        }
    }
}

#[async_trait]
impl Strategy for LibreOfficeStrategy {
    fn name(&self) -> &'static str {
        "libreoffice"
    }

    fn available(&self) -> bool {
        self.binary().is_some()
    }

    async fn run(&self, job: &ConversionJob) -> Result<PathBuf> {
        let binary =
            self.binary().ok_or_else(|| Error::failed("no LibreOffice binary found"))?;
        debug!(binary = %binary.display(), source = %job.source().display(), "running LibreOffice");

        let mut cmd = Command::new(&binary);
        cmd.arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(job.workdir())
            .arg(job.source())
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            // Dropping the wait on timeout must also stop the subprocess.
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                Error::failed(format!(
                    "LibreOffice timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::failed(format!(
                "LibreOffice exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // soffice names the output after the source stem.
        let stem = job
            .source()
            .file_stem()
            .ok_or_else(|| Error::failed("source file has no name"))?;
        let produced = job.workdir().join(stem).with_extension("pdf");
        if !produced.is_file() {
            return Err(Error::failed(
                "LibreOffice reported success but produced no PDF",
            ));
        }
        info!(output = %produced.display(), "LibreOffice conversion complete");
        Ok(produced)
    }
}
