//! PDF conversion through a headless LibreOffice.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("LibreOffice not found. Install LibreOffice and ensure 'soffice' is in PATH.")]
    NotFound,

    #[error("Failed to spawn LibreOffice: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("LibreOffice process error: {0}")]
    Process(String),

    #[error("Converter did not produce {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Failed to remove previous output {}: {source}", path.display())]
    StaleOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Converts a saved `.docx` into a PDF.
pub trait DocumentConverter {
    /// Convert `source` and leave the result at `target`.
    fn convert_to_pdf(&self, source: &Path, target: &Path) -> Result<(), ConvertError>;
}

/// Runs `soffice --headless --convert-to pdf` once per document.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    soffice: PathBuf,
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self {
            soffice: PathBuf::from("soffice"),
        }
    }
}

impl LibreOfficeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `soffice` executable instead of searching PATH.
    pub fn with_executable<P: Into<PathBuf>>(soffice: P) -> Self {
        Self {
            soffice: soffice.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.soffice
    }

    fn command(&self, source: &Path, outdir: &Path) -> Command {
        let mut cmd = Command::new(&self.soffice);
        cmd.arg("--headless")
            .arg("--nologo")
            .arg("--norestore")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(outdir)
            .arg(source);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl DocumentConverter for LibreOfficeConverter {
    fn convert_to_pdf(&self, source: &Path, target: &Path) -> Result<(), ConvertError> {
        let outdir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // soffice exits 0 even when it writes nothing, so an older PDF must
        // not be mistaken for this conversion's output
        let produced = match source.file_stem() {
            Some(stem) => outdir.join(format!("{}.pdf", stem.to_string_lossy())),
            None => return Err(ConvertError::MissingOutput(target.to_path_buf())),
        };
        remove_stale(target)?;
        if produced != target {
            remove_stale(&produced)?;
        }

        let mut cmd = self.command(source, &outdir);
        tracing::debug!("Running LibreOffice: {:?}", cmd);
        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConvertError::NotFound
            } else {
                ConvertError::SpawnFailed(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Process(format!(
                "{} ({})",
                output.status,
                stderr.trim()
            )));
        }

        if produced != target && produced.exists() {
            std::fs::rename(&produced, target)?;
        }

        if !target.exists() {
            return Err(ConvertError::MissingOutput(target.to_path_buf()));
        }
        Ok(())
    }
}

fn remove_stale(path: &Path) -> Result<(), ConvertError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConvertError::StaleOutput {
            path: path.to_path_buf(),
            source,
        }),
    }
}
