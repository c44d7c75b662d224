//! Office-suite backend: hands the document to a headless office process
//! (`soffice --headless --convert-to pdf`) and reads the result back.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use wcr_core::config::OfficeConfig;

use crate::error::{io_err, ConvertError};
use crate::{Converter, Fidelity};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Converts through an external office suite, one document at a time.
///
/// The suite does not tolerate concurrent instances sharing a profile, so
/// every call holds `lock` for the lifetime of the child process.
#[derive(Debug)]
pub struct OfficeConverter {
    program: String,
    timeout: Duration,
    lock: Mutex<()>,
}

impl OfficeConverter {
    pub fn new(config: &OfficeConfig) -> Self {
        OfficeConverter {
            program: config.program.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            lock: Mutex::new(()),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Converter for OfficeConverter {
    fn convert(&self, name: &str, document: &[u8]) -> Result<Vec<u8>, ConvertError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let work = tempfile::tempdir().map_err(|e| io_err(std::env::temp_dir(), e))?;
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("document");
        let input = work.path().join(format!("{stem}.docx"));
        std::fs::write(&input, document).map_err(|e| io_err(&input, e))?;

        let mut child = Command::new(&self.program)
            .args(["--headless", "--norestore", "--convert-to", "pdf", "--outdir"])
            .arg(work.path())
            .arg(&input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ConvertError::Launch {
                program: self.program.clone(),
                source,
            })?;

        // Drained concurrently so a chatty suite never blocks on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait().map_err(|e| io_err(&self.program, e))? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!("{} timed out converting {name}; process killed", self.program);
                    return Err(ConvertError::Timeout {
                        program: self.program.clone(),
                        secs: self.timeout.as_secs(),
                    });
                }
                None => sleep(POLL_INTERVAL),
            }
        };

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
            .unwrap_or_default();
        if !status.success() {
            return Err(ConvertError::Failed {
                program: self.program.clone(),
                status,
                stderr,
            });
        }

        let output = work.path().join(format!("{stem}.pdf"));
        if !output.exists() {
            return Err(ConvertError::MissingOutput { path: output });
        }
        std::fs::read(&output).map_err(|e| io_err(&output, e))
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_launch_error() {
        let converter = OfficeConverter::new(&OfficeConfig {
            program: "/nonexistent/wcr-office-suite".into(),
            timeout_secs: 5,
        });
        let err = converter.convert("WCR_1.docx", b"PK").unwrap_err();
        assert!(matches!(err, ConvertError::Launch { .. }), "got: {err}");
        assert!(err.to_string().contains("wcr-office-suite"));
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let converter = OfficeConverter::new(&OfficeConfig {
            program: "soffice".into(),
            timeout_secs: 0,
        });
        assert_eq!(converter.timeout, Duration::from_secs(1));
        assert_eq!(converter.fidelity(), Fidelity::Native);
    }
}
