//! External diagram renderers.
//!
//! The renderer is an I/O boundary: the resolver only needs to know whether a tool is usable and
//! how to turn one source file into a PNG inside an output directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::DiagramError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Turns a diagram source file into a raster picture.
pub trait DiagramRenderer {
    /// Whether the tool can run at all. Called once per run.
    fn is_available(&self) -> bool;

    /// Render `input` into `output_dir`, returning the produced picture.
    fn render(&self, input: &Path, output_dir: &Path, timeout: Duration) -> Result<PathBuf, DiagramError>;
}

/// PlantUML through `java -jar plantuml.jar`.
#[derive(Debug, Clone)]
pub struct PlantUmlRenderer {
    java: PathBuf,
    jar: PathBuf,
}

impl PlantUmlRenderer {
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: jar.into(),
        }
    }

    /// Use a specific `java` executable instead of the one on `PATH`.
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }
}

impl DiagramRenderer for PlantUmlRenderer {
    fn is_available(&self) -> bool {
        if !self.jar.is_file() {
            tracing::warn!(jar = %self.jar.display(), "PlantUML jar not found, diagrams disabled");
            return false;
        }
        let java = Command::new(&self.java)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match java {
            Ok(status) if status.success() => true,
            Ok(status) => {
                tracing::warn!(%status, "java -version failed, diagrams disabled");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "java not found, diagrams disabled");
                false
            }
        }
    }

    fn render(&self, input: &Path, output_dir: &Path, timeout: Duration) -> Result<PathBuf, DiagramError> {
        let stem = input
            .file_stem()
            .ok_or_else(|| DiagramError::NoOutput {
                expected: output_dir.to_path_buf(),
            })?
            .to_string_lossy()
            .to_string();

        let mut child = Command::new(&self.java)
            .arg("-Djava.awt.headless=true")
            .arg("-jar")
            .arg(&self.jar)
            .arg(input)
            .arg("-o")
            .arg(output_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DiagramError::Spawn {
                program: self.java.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        let status = loop {
            let polled = child.try_wait().map_err(|source| DiagramError::Spawn {
                program: self.java.clone(),
                source,
            })?;
            if let Some(status) = polled {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DiagramError::Timeout {
                    input: input.to_path_buf(),
                    timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(DiagramError::Failed {
                input: input.to_path_buf(),
                code: status.code(),
            });
        }

        let expected = output_dir.join(format!("{stem}.png"));
        if expected.is_file() {
            Ok(expected)
        } else {
            Err(DiagramError::NoOutput { expected })
        }
    }
}

/// A renderer that is never available. Diagrams degrade to their directive text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRenderer;

impl DiagramRenderer for DisabledRenderer {
    fn is_available(&self) -> bool {
        false
    }

    fn render(&self, input: &Path, _output_dir: &Path, _timeout: Duration) -> Result<PathBuf, DiagramError> {
        Err(DiagramError::Unavailable {
            input: input.to_path_buf(),
        })
    }
}
