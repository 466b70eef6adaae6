use super::*;
use crate::lexer::lex;

fn parse_str(source: &str) -> Result<Feature, Vec<SyntaxError>> {
    let lines = lex(source)?;
    parse(&lines)
}

fn messages(source: &str) -> Vec<String> {
    parse_str(source).unwrap_err().into_iter().map(|e| e.message).collect()
}

const LOGIN: &str = r#"@US-12 @web
Feature: Login
  As a visitor
  I want to sign in
  So that I see my dashboard

  Background:
    Given the site is up

  @smoke
  Scenario: valid credentials
    Given a registered user
    When they sign in with
      | user  | password |
      | alice | secret   |
    Then the dashboard shows
      """
      Welcome alice
      """

  Scenario Outline: wrong password
    Given a registered user
    When they type <password>
    Then an error is shown

    @negative
    Examples: typos
      | password |
      | secre    |
      | secrett  |
"#;

#[test]
fn test_full_feature() {
    let feature = parse_str(LOGIN).unwrap();
    assert_eq!(feature.name, "Login");
    assert_eq!(feature.tags, vec!["US-12", "web"]);
    assert_eq!(
        feature.description,
        vec!["As a visitor", "I want to sign in", "So that I see my dashboard"]
    );

    let background = feature.background.as_ref().unwrap();
    assert_eq!(background.steps.len(), 1);
    assert_eq!(background.steps[0].keyword, "Given");

    assert_eq!(feature.scenarios.len(), 2);
    let valid = &feature.scenarios[0];
    assert_eq!(valid.tags, vec!["smoke"]);
    assert!(!valid.is_outline());
    let table = valid.steps[1].table.as_ref().unwrap();
    assert_eq!(table.headings, vec!["user", "password"]);
    assert_eq!(table.rows, vec![vec!["alice".to_string(), "secret".to_string()]]);
    assert_eq!(valid.steps[2].docstring.as_deref(), Some("Welcome alice"));

    let outline = &feature.scenarios[1];
    assert!(outline.is_outline());
    assert_eq!(outline.tags, Vec::<String>::new());
    assert_eq!(outline.examples.len(), 1);
    assert_eq!(outline.examples[0].name, "typos");
    assert_eq!(outline.examples[0].tags, vec!["negative"]);
    assert_eq!(outline.examples[0].table.as_ref().unwrap().rows.len(), 2);
}

fn outline(feature: &Feature) -> String {
    let mut lines = vec![format!("{}: {}", feature.keyword, feature.name)];
    if let Some(background) = &feature.background {
        lines.push(format!("  {}: [{} steps]", background.keyword, background.steps.len()));
    }
    for scenario in &feature.scenarios {
        lines.push(format!("  {}: {} [{} steps]", scenario.keyword, scenario.name, scenario.steps.len()));
        for examples in &scenario.examples {
            let rows = examples.table.as_ref().map_or(0, |t| t.rows.len());
            lines.push(format!("    {}: {} [{rows} rows]", examples.keyword, examples.name));
        }
    }
    lines.join("\n")
}

#[test]
fn test_full_feature_outline_snapshot() {
    let feature = parse_str(LOGIN).unwrap();
    insta::assert_snapshot!(outline(&feature), @r"
    Feature: Login
      Background: [1 steps]
      Scenario: valid credentials [3 steps]
      Scenario Outline: wrong password [3 steps]
        Examples: typos [2 rows]
    ");
}

#[test]
fn test_tags_after_steps_belong_to_next_scenario() {
    let source = "Feature: f\n  Scenario: a\n    Given x\n  @next\n  Scenario: b\n    Given y\n";
    let feature = parse_str(source).unwrap();
    assert!(feature.scenarios[0].tags.is_empty());
    assert_eq!(feature.scenarios[1].tags, vec!["next"]);
}

#[test]
fn test_feature_description_keeps_step_like_lines() {
    let source = "Feature: f\n  Given the business rules below\n  And more text\n";
    let feature = parse_str(source).unwrap();
    assert_eq!(feature.description, vec!["Given the business rules below", "And more text"]);
}

#[test]
fn test_feature_description_keeps_markdown_tables_and_fences() {
    let source = "\
Feature: f
  Rules:
  | a | b |
  |---|---|
  | 1 | 2 |

  ```text
    indented
  Scenario: inside a fence
  ```

  Scenario: s
    Given x
";
    let feature = parse_str(source).unwrap();
    assert_eq!(
        feature.description,
        vec![
            "Rules:",
            "| a | b |",
            "|---|---|",
            "| 1 | 2 |",
            "",
            "```text",
            "  indented",
            "Scenario: inside a fence",
            "```",
        ]
    );
    assert_eq!(feature.scenarios.len(), 1);
    assert_eq!(feature.scenarios[0].name, "s");
}

#[test]
fn test_docstring_with_unicode_indentation() {
    let source = "Feature: F\n  Scenario: s\n    Given a payload\n \"\"\"\n\u{3000}x\n \"\"\"\n";
    let feature = parse_str(source).unwrap();
    assert_eq!(feature.scenarios[0].steps[0].docstring.as_deref(), Some("\u{3000}x"));
}

#[test]
fn test_scenario_description_rejects_table() {
    let errs = messages("Feature: f\n  Scenario: s\n    | a |\n    Given x\n");
    assert!(errs[0].contains("Table rows must follow a step"));
}

#[test]
fn test_scenario_description_before_steps() {
    let source = "Feature: f\n  Scenario: a\n    some context\n\n    Given x\n";
    let feature = parse_str(source).unwrap();
    assert_eq!(feature.scenarios[0].description, vec!["some context"]);
    assert_eq!(feature.scenarios[0].steps.len(), 1);
}

#[test]
fn test_empty_file() {
    let errs = messages("# just a comment\n");
    assert!(errs[0].contains("file is empty"));
}

#[test]
fn test_text_before_feature() {
    let errs = messages("hello\nFeature: f\n");
    assert!(errs[0].contains("Expected 'Feature:'"));
}

#[test]
fn test_second_feature_rejected() {
    let errs = messages("Feature: a\nFeature: b\n");
    assert_eq!(errs, vec!["Only one 'Feature:' is allowed per file"]);
}

#[test]
fn test_step_after_examples_is_outside_scenario() {
    let source = "Feature: f\n  Scenario Outline: a\n    Given <x>\n    Examples:\n      | x |\n      | 1 |\n    Then y\n";
    let errs = messages(source);
    assert_eq!(errs, vec!["Unexpected 'Then y' outside of a scenario"]);
}

#[test]
fn test_examples_in_plain_scenario_has_hint() {
    let source = "Feature: f\n  Scenario: a\n    Given <x>\n    Examples:\n      | x |\n      | 1 |\n";
    let errs = parse_str(source).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert!(errs[0].hints[0].contains("Scenario Outline: a"));
}

#[test]
fn test_inconsistent_cell_count() {
    let source = "Feature: f\n  Scenario: a\n    Given x\n      | a | b |\n      | 1 |\n";
    let errs = messages(source);
    assert!(errs[0].starts_with("Inconsistent cell count"));
}

#[test]
fn test_orphan_table() {
    let source = "Feature: f\n  Scenario: a\n    | a |\n";
    let errs = messages(source);
    assert!(errs[0].contains("must follow a step"));
}

#[test]
fn test_rule_is_rejected_with_hint() {
    let errs = parse_str("Feature: f\n  Rule: r\n").unwrap_err();
    assert!(errs[0].message.contains("'Rule:'"));
    assert!(!errs[0].hints.is_empty());
}

#[test]
fn test_recovery_reports_every_broken_scenario() {
    let source = "Feature: f\n  Scenario: a\n    Given x\n    oops\n  Scenario: b\n    Given ok\n  Scenario: c\n    Given y\n    again oops\n";
    let errs = messages(source);
    assert_eq!(errs.len(), 2);
    assert!(errs[0].contains("'oops'"));
    assert!(errs[1].contains("'again oops'"));
}

#[test]
fn test_background_after_scenario() {
    let errs = messages("Feature: f\n  Scenario: a\n  Background:\n    Given x\n");
    assert!(errs[0].contains("Background must come once"));
}

#[test]
fn test_dangling_tags() {
    let errs = messages("Feature: f\n  Scenario: a\n    Given x\n  @orphan\n");
    assert!(errs[0].contains("not followed by a scenario"));
}
