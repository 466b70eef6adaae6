//! Diagram resolution
//!
//! Turns a diagram reference found in a description or a foreword (`!!Workflow: flows/login.puml`,
//! a fenced `puml` block, a picture link) into the path of a PNG that fits the page.
//!
//! ## Modules
//!
//! - `render` - External renderers (`DiagramRenderer`, PlantUML)
//! - `resize` - Page-box fitting
//!
//! ## Notes
//!
//! - A `<stem>.png` next to the referenced source is reused as is. The cache is keyed by file name
//!   only, so a PNG older than its source is reused too (logged at debug level).
//! - Every generated or resized file goes to the run's scratch directory; files of the repository
//!   are only read.
//! - Diagrams are best effort: failures are logged and resolve to `None`.

pub mod render;
pub mod resize;

use std::cell::{Cell, OnceCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub use render::{DiagramRenderer, DisabledRenderer, PlantUmlRenderer};
pub use resize::{PAGE_HEIGHT, PAGE_WIDTH, fit_picture, fit_within};

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("diagram tool unavailable, cannot render {}", .input.display())]
    Unavailable { input: PathBuf },

    #[error("cannot start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("rendering {} timed out after {}s", .input.display(), .timeout.as_secs())]
    Timeout { input: PathBuf, timeout: Duration },

    #[error("rendering {} failed (exit code {})", .input.display(), code_label(.code))]
    Failed { input: PathBuf, code: Option<i32> },

    #[error("renderer produced no picture at {}", .expected.display())]
    NoOutput { expected: PathBuf },

    #[error("cannot process picture {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

fn code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Resolves diagram references for one run.
pub struct DiagramResolver {
    renderer: Box<dyn DiagramRenderer>,
    scratch: PathBuf,
    timeout: Duration,
    available: OnceCell<bool>,
    /// Numbers scratch outputs so they never collide.
    outputs: Cell<usize>,
    /// Numbers inline diagrams (`inline_p_<n>.puml`).
    inline: Cell<usize>,
}

impl DiagramResolver {
    pub fn new(renderer: Box<dyn DiagramRenderer>, scratch: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            renderer,
            scratch: scratch.into(),
            timeout,
            available: OnceCell::new(),
            outputs: Cell::new(0),
            inline: Cell::new(0),
        }
    }

    /// Whether the renderer can run. Probed on first use only.
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.renderer.is_available())
    }

    /// Resolve `reference` against `base_folder` to a fitted PNG.
    pub fn resolve(&self, reference: &str, base_folder: &Path) -> Option<PathBuf> {
        let source = base_folder.join(reference.trim());
        let cached = source.with_extension("png");

        let picture = if cached.is_file() {
            if is_stale(&cached, &source) {
                tracing::debug!(picture = %cached.display(), "reusing a picture older than its diagram source");
            } else {
                tracing::debug!(picture = %cached.display(), "reusing cached picture");
            }
            cached
        } else if !source.is_file() {
            tracing::warn!(diagram = %source.display(), "diagram source not found");
            return None;
        } else {
            self.render(&source)?
        };

        self.fit(&picture)
    }

    /// Render an inline diagram source (the body of a fenced `puml` block).
    ///
    /// The source is written to `inline_p_<n>.puml` in the scratch directory, `n` increasing for
    /// every rendered diagram of the run. Returns `n` and the fitted picture.
    pub fn render_inline(&self, source: &str) -> Option<(usize, PathBuf)> {
        if !self.is_available() {
            return None;
        }
        let n = self.inline.get() + 1;
        self.inline.set(n);

        let input = self.scratch.join(format!("inline_p_{n}.puml"));
        if let Err(e) = fs::write(&input, source) {
            tracing::warn!(path = %input.display(), error = %e, "cannot write inline diagram");
            return None;
        }
        let picture = self.render(&input)?;
        self.fit(&picture).map(|path| (n, path))
    }

    /// Fit an existing picture to the page, copying it to the scratch directory when it must shrink.
    pub fn fit(&self, picture: &Path) -> Option<PathBuf> {
        let stem = picture.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let dest = self.scratch.join(format!("fit_{}_{stem}.png", self.next_output()));
        match fit_picture(picture, &dest) {
            Ok(path) => Some(absolute(path)),
            Err(e) => {
                tracing::warn!(error = %e, "picture not resized");
                None
            }
        }
    }

    fn render(&self, source: &Path) -> Option<PathBuf> {
        if !self.is_available() {
            tracing::warn!(diagram = %source.display(), "diagram tool unavailable, skipping");
            return None;
        }
        let output_dir = self.scratch.join(format!("render_{}", self.next_output()));
        if let Err(e) = fs::create_dir_all(&output_dir) {
            tracing::warn!(path = %output_dir.display(), error = %e, "cannot create render directory");
            return None;
        }
        tracing::info!(diagram = %source.display(), "rendering diagram");
        match self.renderer.render(&absolute(source.to_path_buf()), &output_dir, self.timeout) {
            Ok(picture) => Some(picture),
            Err(e) => {
                tracing::warn!(error = %e, "diagram not rendered");
                None
            }
        }
    }

    fn next_output(&self) -> usize {
        let n = self.outputs.get() + 1;
        self.outputs.set(n);
        n
    }
}

fn is_stale(picture: &Path, source: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    matches!((modified(picture), modified(source)), (Some(p), Some(s)) if p < s)
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeRenderer;
    use super::*;

    fn resolver(renderer: Box<dyn DiagramRenderer>, scratch: &Path) -> DiagramResolver {
        DiagramResolver::new(renderer, scratch, Duration::from_secs(5))
    }

    #[test]
    fn test_cached_png_is_reused() {
        let repo = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        fs::write(repo.path().join("flow.puml"), "@startuml\n@enduml\n").unwrap();
        image::RgbImage::new(100, 50).save(repo.path().join("flow.png")).unwrap();

        let fake = FakeRenderer::new((10, 10));
        let calls = fake.calls.clone();
        let resolver = resolver(Box::new(fake), scratch.path());
        let path = resolver.resolve("flow.puml", repo.path()).unwrap();
        assert_eq!(path, repo.path().join("flow.png"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_renders_and_fits_into_scratch() {
        let repo = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        fs::write(repo.path().join("flow.puml"), "@startuml\n@enduml\n").unwrap();

        let resolver = resolver(Box::new(FakeRenderer::new((1000, 500))), scratch.path());
        let path = resolver.resolve("flow.puml", repo.path()).unwrap();
        assert!(path.starts_with(scratch.path()));
        assert_eq!(image::image_dimensions(&path).unwrap(), (580, 290));
        assert!(!repo.path().join("flow.png").exists());
    }

    #[test]
    fn test_unavailable_tool_resolves_to_none() {
        let repo = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        fs::write(repo.path().join("flow.puml"), "@startuml\n@enduml\n").unwrap();
        let resolver = resolver(Box::new(DisabledRenderer), scratch.path());
        assert_eq!(resolver.resolve("flow.puml", repo.path()), None);
    }

    #[test]
    fn test_missing_source_resolves_to_none() {
        let repo = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let resolver = resolver(Box::new(FakeRenderer::new((10, 10))), scratch.path());
        assert_eq!(resolver.resolve("missing.puml", repo.path()), None);
    }

    #[test]
    fn test_inline_counter_increases() {
        let scratch = tempfile::tempdir().unwrap();
        let resolver = resolver(Box::new(FakeRenderer::new((10, 10))), scratch.path());
        assert_eq!(resolver.render_inline("@startuml\nA -> B\n@enduml\n").unwrap().0, 1);
        assert_eq!(resolver.render_inline("@startuml\nB -> C\n@enduml\n").unwrap().0, 2);
        assert!(scratch.path().join("inline_p_1.puml").is_file());
        assert!(scratch.path().join("inline_p_2.puml").is_file());
    }

    #[test]
    fn test_inline_without_tool_writes_nothing() {
        let scratch = tempfile::tempdir().unwrap();
        let resolver = resolver(Box::new(DisabledRenderer), scratch.path());
        assert_eq!(resolver.render_inline("@startuml\n@enduml\n"), None);
        assert!(!scratch.path().join("inline_p_1.puml").exists());
    }

    #[test]
    fn test_availability_is_probed_once() {
        struct Counting(std::rc::Rc<Cell<usize>>);
        impl DiagramRenderer for Counting {
            fn is_available(&self) -> bool {
                self.0.set(self.0.get() + 1);
                false
            }
            fn render(&self, input: &Path, _: &Path, _: Duration) -> Result<PathBuf, DiagramError> {
                Err(DiagramError::Unavailable {
                    input: input.to_path_buf(),
                })
            }
        }
        let probes = std::rc::Rc::new(Cell::new(0));
        let scratch = tempfile::tempdir().unwrap();
        let resolver = resolver(Box::new(Counting(probes.clone())), scratch.path());
        resolver.render_inline("a");
        resolver.render_inline("b");
        assert!(!resolver.is_available());
        assert_eq!(probes.get(), 1);
    }
}
