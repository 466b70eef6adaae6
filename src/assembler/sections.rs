//! Section emitters for one parsed feature.
//!
//! Every emitter takes the [`HeadingLevels`] of the run; nothing here decides nesting on its own.

use std::path::Path;

use featuredoc_syntax::{Background, DataTable, Examples, Feature, Scenario, Step};

use crate::config::HeadingLevels;
use crate::diagram::DiagramResolver;
use crate::document::{Document, ParagraphStyle, Run};
use crate::markup::insert_markup;
use crate::rewrite;

const AND_KEYWORD: &str = "And";

/// Per-run settings shared by every feature section.
pub struct SectionContext<'a> {
    pub levels: HeadingLevels,
    pub tag_prefix: Option<&'a str>,
    /// Folder `!!Workflow:` references are resolved against.
    pub repository: &'a Path,
    pub resolver: &'a DiagramResolver,
}

/// Emit the whole section of `feature`, ending with a page break.
pub fn feature_section(document: &mut Document, feature: &Feature, ctx: &SectionContext<'_>) {
    tracing::info!(feature = %feature.name, "processing feature");
    document.add_heading(feature.name.as_str(), ctx.levels.h1());
    feature_tags(document, &feature.tags, ctx.tag_prefix);
    description(document, &feature.description, ctx);
    if let Some(background) = &feature.background {
        background_section(document, background, ctx.levels);
    }
    for scenario in &feature.scenarios {
        scenario_section(document, scenario, &feature.tags, ctx.levels);
    }
    document.add_page_break();
}

/// "Related to the user story" line for tags containing `prefix`, then the feature tags line.
pub fn feature_tags(document: &mut Document, tags: &[String], prefix: Option<&str>) {
    if let Some(prefix) = prefix {
        let related: Vec<&String> = tags.iter().filter(|tag| tag.contains(prefix)).collect();
        if !related.is_empty() {
            document.add_paragraph(
                vec![
                    Run::text("Related to the user story: ").underline(),
                    Run::text(quoted(related)),
                ],
                ParagraphStyle::Normal,
            );
        }
    }
    if !tags.is_empty() {
        document.add_text(format!("Feature tags are {}", quoted(tags)), ParagraphStyle::Normal);
    }
}

/// Description lines, rewritten then rendered as Markdown.
pub fn description(document: &mut Document, lines: &[String], ctx: &SectionContext<'_>) {
    if lines.is_empty() {
        return;
    }
    let text = lines.join("\n");
    let text = rewrite::emphasize_user_story(&text);
    let text = rewrite::business_rules_heading(&text, ctx.levels.h2());
    let text = rewrite::annotate_workflows(&text, ctx.repository, ctx.resolver);
    insert_markup(document, &text);
}

pub fn background_section(document: &mut Document, background: &Background, levels: HeadingLevels) {
    document.add_heading(titled(&background.keyword, &background.name), levels.h2());
    steps(document, &background.steps);
}

/// Scenario heading, its tags, its steps and, for outlines, its examples.
pub fn scenario_section(document: &mut Document, scenario: &Scenario, feature_tags: &[String], levels: HeadingLevels) {
    tracing::info!(scenario = %scenario.name, "processing scenario");
    document.add_heading(titled(&scenario.keyword, &scenario.name), levels.h2());

    let mut tags: Vec<&String> = Vec::new();
    for tag in feature_tags.iter().chain(&scenario.tags) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    if !tags.is_empty() {
        document.add_text(format!("Scenario tags are {}", quoted(tags)), ParagraphStyle::NoSpacing);
    }

    steps(document, &scenario.steps);
    if scenario.is_outline() {
        for examples in &scenario.examples {
            examples_section(document, examples, levels);
        }
    }
}

pub fn examples_section(document: &mut Document, examples: &Examples, levels: HeadingLevels) {
    tracing::debug!(examples = %examples.name, "processing examples");
    document.add_heading(titled(&examples.keyword, &examples.name), levels.h3());
    if let Some(table) = &examples.table {
        data_table(document, table);
    }
}

/// Steps as bold keyword plus text. A keyword repeating the previous one is written `And`.
pub fn steps(document: &mut Document, steps: &[Step]) {
    let mut previous: Option<&str> = None;
    for step in steps {
        let keyword = if previous == Some(step.keyword.as_str()) {
            AND_KEYWORD
        } else {
            previous = Some(step.keyword.as_str());
            step.keyword.as_str()
        };
        document.add_paragraph(
            vec![Run::text(keyword).bold(), Run::text(format!(" {}", step.text))],
            ParagraphStyle::NoSpacing,
        );
        if let Some(table) = &step.table {
            data_table(document, table);
        }
        if let Some(docstring) = &step.docstring {
            let mut runs = Vec::new();
            for (i, line) in docstring.lines().enumerate() {
                if i > 0 {
                    runs.push(Run::line_break());
                }
                runs.push(Run::text(line).monospace());
            }
            document.add_paragraph(runs, ParagraphStyle::Code);
        }
    }
}

pub fn data_table(document: &mut Document, table: &DataTable) {
    let mut rows = Vec::with_capacity(table.rows.len() + 1);
    rows.push(table.headings.clone());
    rows.extend(table.rows.iter().cloned());
    document.add_table(rows);
}

fn titled(keyword: &str, name: &str) -> String {
    format!("{keyword}: {name}").trim_end().to_string()
}

/// `'a', 'b'`
fn quoted<S: AsRef<str>>(tags: impl IntoIterator<Item = S>) -> String {
    tags.into_iter()
        .map(|tag| format!("'{}'", tag.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use featuredoc_syntax::parse_feature;

    use super::*;
    use crate::diagram::DisabledRenderer;
    use crate::document::Block;

    fn render(source: &str, levels: HeadingLevels, prefix: Option<&str>) -> String {
        render_document(source, levels, prefix).outline()
    }

    fn render_document(source: &str, levels: HeadingLevels, prefix: Option<&str>) -> Document {
        let feature = parse_feature(source).unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let resolver = DiagramResolver::new(Box::new(DisabledRenderer), scratch.path(), Duration::from_secs(1));
        let ctx = SectionContext {
            levels,
            tag_prefix: prefix,
            repository: scratch.path(),
            resolver: &resolver,
        };
        let mut doc = Document::new();
        feature_section(&mut doc, &feature, &ctx);
        doc
    }

    #[test]
    fn test_feature_section() {
        let source = "\
@US-12 @web
Feature: Login
  As a visitor
  I want to sign in

  Background:
    Given the site is up

  @smoke
  Scenario: valid credentials
    Given a registered user
    Given an open login page
    When they sign in
    Then they see the dashboard
";
        insta::assert_snapshot!(render(source, HeadingLevels::new(false), Some("US-")), @r"
        ## Login
        Related to the user story: 'US-12'
        Feature tags are 'US-12', 'web'
        As a visitor\nI want to sign in\n
        ### Background:
        [NoSpacing] Given the site is up
        ### Scenario: valid credentials
        [NoSpacing] Scenario tags are 'US-12', 'web', 'smoke'
        [NoSpacing] Given a registered user
        [NoSpacing] And an open login page
        [NoSpacing] When they sign in
        [NoSpacing] Then they see the dashboard
        ---
        ");
    }

    #[test]
    fn test_description_table_and_code_are_markdown() {
        let source = "\
Feature: Pricing
  Rates:

  | plan | price |
  |------|-------|
  | pro  | 10    |

  ```
  Given is not a step here
  ```

  Scenario: s
    Given x
";
        let doc = render_document(source, HeadingLevels::new(false), None);
        assert!(doc.blocks().contains(&Block::Table {
            rows: vec![
                vec!["plan".to_string(), "price".to_string()],
                vec!["pro".to_string(), "10".to_string()],
            ]
        }));
        assert!(doc.blocks().iter().any(|block| matches!(
            block,
            Block::Paragraph { style: ParagraphStyle::Code, runs } if runs[0].text == "Given is not a step here"
        )));
        assert!(doc.headings().any(|(_, t)| t == "Scenario: s"));
    }

    #[test]
    fn test_outline_examples_nested() {
        let source = "\
Feature: Search
  Scenario Outline: by term
    When I search <term>
    Then I get <count> results

    Examples: common
      | term | count |
      | rust | 10    |
";
        let outline = render(source, HeadingLevels::new(true), None);
        assert!(outline.contains("\n#### Scenario Outline: by term\n"));
        assert!(outline.contains("\n##### Examples: common\n| term | count |\n| rust | 10 |"));
        assert!(!outline.contains("tags are"));
    }

    #[test]
    fn test_plain_scenario_never_shows_examples() {
        let mut doc = Document::new();
        let scenario = Scenario {
            keyword: "Scenario".into(),
            kind: featuredoc_syntax::ScenarioKind::Scenario,
            name: "plain".into(),
            tags: Vec::new(),
            description: Vec::new(),
            steps: Vec::new(),
            examples: vec![Examples {
                keyword: "Examples".into(),
                name: "stray".into(),
                tags: Vec::new(),
                table: None,
                span: Default::default(),
            }],
            span: Default::default(),
        };
        scenario_section(&mut doc, &scenario, &[], HeadingLevels::new(false));
        assert_eq!(doc.outline(), "### Scenario: plain");
    }

    #[test]
    fn test_keyword_tracking_resets() {
        let feature = parse_feature(
            "Feature: f\n  Scenario: s\n    Given a\n    Given b\n    When c\n    Given d\n    Given e\n",
        )
        .unwrap();
        let mut doc = Document::new();
        steps(&mut doc, &feature.scenarios[0].steps);
        insta::assert_snapshot!(doc.outline(), @r"
        [NoSpacing] Given a
        [NoSpacing] And b
        [NoSpacing] When c
        [NoSpacing] Given d
        [NoSpacing] And e
        ");
    }

    #[test]
    fn test_docstring_is_code() {
        let feature = parse_feature(
            "Feature: f\n  Scenario: s\n    Given a payload\n      \"\"\"\n      {\"a\": 1}\n      {\"b\": 2}\n      \"\"\"\n",
        )
        .unwrap();
        let mut doc = Document::new();
        steps(&mut doc, &feature.scenarios[0].steps);
        assert!(doc.outline().ends_with("[Code] {\"a\": 1}\\n{\"b\": 2}"));
    }

    #[test]
    fn test_tags_without_prefix_match() {
        let mut doc = Document::new();
        feature_tags(&mut doc, &["web".into()], Some("US-"));
        assert_eq!(doc.outline(), "Feature tags are 'web'");
    }
}
