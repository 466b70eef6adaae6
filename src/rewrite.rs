//! Text passes applied to Markdown before it reaches the markup inserter.
//!
//! Every pass maps a string to a new string and leaves text it does not recognise untouched.
//! Passes that reference pictures take the [`DiagramResolver`] of the run; the others are pure.
//!
//! | Pass | Input | Output |
//! |---|---|---|
//! | [`shift_headings`] | `## Title` | `### Title` |
//! | [`rewrite_pictures`] | `![alt](img/a.png)` | `![alt](/abs/fitted.png)` |
//! | [`render_inline_diagrams`] | fenced `puml` block | `![Diag n](/abs/inline.png)` or nothing |
//! | [`rewrite_workflows`] | `!!Workflow: a.puml` | `![Schema](/abs/a.png)` |
//! | [`annotate_workflows`] | `!!Workflow: a.puml` | `![Schema](/abs/a.png)` + directive text |
//! | [`emphasize_user_story`] | `As a user` | `**As** a user<br>` |
//! | [`business_rules_heading`] | `Business rules:` | `## Business Rules` |

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::diagram::DiagramResolver;

static PICTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\[\]]*)\]\(([^)\s]+)\)").expect("INVARIANT: picture pattern is a valid regex")
});

static INLINE_DIAGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:puml|plantuml)[^\S\n]*\r?\n(.*?)```")
        .expect("INVARIANT: inline diagram pattern is a valid regex")
});

static WORKFLOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!!Workflow:[^\S\n]*([\w./\\-]+)[^\S\n]*").expect("INVARIANT: workflow pattern is a valid regex")
});

static USER_STORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^([^\S\n]*)(as|i want|so that)\b([^\n]*?)[^\S\n]*$")
        .expect("INVARIANT: user story pattern is a valid regex")
});

static BUSINESS_RULES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[^\n]*business rules[^\n]*$").expect("INVARIANT: business rules pattern is a valid regex")
});

const CODE_FENCES: [&str; 2] = ["```", "~~~"];

/// Nest every Markdown heading one level deeper. Lines inside fenced code blocks are left alone.
pub fn shift_headings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut open_fence: Option<&str> = None;
    for line in text.split_inclusive('\n') {
        let marker = line.trim_start();
        match open_fence {
            Some(fence) => {
                if marker.starts_with(fence) {
                    open_fence = None;
                }
            }
            None => {
                if let Some(fence) = CODE_FENCES.iter().find(|f| marker.starts_with(**f)) {
                    open_fence = Some(*fence);
                } else if line.starts_with('#') {
                    out.push('#');
                }
            }
        }
        out.push_str(line);
    }
    out
}

/// Point relative picture links at a page-fitted copy, rooted at `folder`.
///
/// Remote URLs and missing files are left as written.
pub fn rewrite_pictures(text: &str, folder: &Path, resolver: &DiagramResolver) -> String {
    PICTURE
        .replace_all(text, |caps: &Captures| {
            let (alt, dest) = (&caps[1], &caps[2]);
            if dest.contains("://") {
                return caps[0].to_string();
            }
            let path = folder.join(dest);
            if !path.is_file() {
                tracing::warn!(picture = %path.display(), "picture not found, link left as is");
                return caps[0].to_string();
            }
            match resolver.fit(&path) {
                Some(fitted) => format!("![{alt}]({})", link_target(&fitted)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Replace fenced `puml` blocks with a link to the rendered diagram, or drop them when the
/// diagram tool is unavailable.
pub fn render_inline_diagrams(text: &str, resolver: &DiagramResolver) -> String {
    INLINE_DIAGRAM
        .replace_all(text, |caps: &Captures| match resolver.render_inline(&caps[1]) {
            Some((n, picture)) => format!("\n![Diag {n}]({})\n", link_target(&picture)),
            None => String::new(),
        })
        .into_owned()
}

/// Replace `!!Workflow: <ref>` with the rendered diagram. Unresolvable directives stay as written.
pub fn rewrite_workflows(text: &str, folder: &Path, resolver: &DiagramResolver) -> String {
    WORKFLOW
        .replace_all(text, |caps: &Captures| match resolver.resolve(&caps[1], folder) {
            Some(picture) => format!("\n![Schema]({})\n", link_target(&picture)),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Like [`rewrite_workflows`], but the directive text is kept under the picture. Without the
/// diagram tool only the directive text remains.
pub fn annotate_workflows(text: &str, folder: &Path, resolver: &DiagramResolver) -> String {
    WORKFLOW
        .replace_all(text, |caps: &Captures| {
            let directive = format!("!!Workflow: {}", &caps[1]);
            match resolver.resolve(&caps[1], folder) {
                Some(picture) => format!("\n![Schema]({})\n\n{directive}", link_target(&picture)),
                None => directive,
            }
        })
        .into_owned()
}

/// Bold the `As` / `I want` / `So that` phrase of user-story lines and end each with a line break.
pub fn emphasize_user_story(text: &str) -> String {
    USER_STORY
        .replace_all(text, |caps: &Captures| {
            let phrase = match caps[2].to_ascii_lowercase().as_str() {
                "as" => "As",
                "i want" => "I want",
                _ => "So that",
            };
            format!("{}**{phrase}**{}<br>", &caps[1], &caps[3])
        })
        .into_owned()
}

/// Turn any line mentioning business rules into a "Business Rules" heading at `level`.
pub fn business_rules_heading(text: &str, level: usize) -> String {
    let heading = format!("{} Business Rules", "#".repeat(level.max(1)));
    BUSINESS_RULES.replace_all(text, regex::NoExpand(&heading)).into_owned()
}

/// Markdown link destination for a local path.
fn link_target(path: &Path) -> String {
    let target = path.to_string_lossy().replace('\\', "/");
    if target.contains(' ') {
        format!("<{target}>")
    } else {
        target
    }
}
