//! Learning outcome documents (`Learning Outcomes/**/*.md`).

use super::{id_field, lens_ref, read_frontmatter, string_field};
use crate::fields::{parse_blocks, BlockGrammar};
use crate::models::{LearningOutcomeDoc, ParseOutcome};
use coursemark_types::ContentError;

const LEARNING_OUTCOME_GRAMMAR: BlockGrammar<'static> = BlockGrammar {
    levels: &[2],
    keywords: &["Lens", "Test"],
};

/// Parse a learning outcome file
///
/// `## Test:` blocks hold assessment material that the pipeline does not
/// render; they are accepted and skipped.
pub fn parse_learning_outcome(content: &str, path: &str) -> ParseOutcome<LearningOutcomeDoc> {
    let mut errors = Vec::new();
    let Some(parsed) = read_frontmatter(content, path, &mut errors) else {
        return ParseOutcome::failed(errors);
    };
    let fm = &parsed.frontmatter;

    let id = id_field(fm, path, true, &mut errors);
    let statement = string_field(fm, "learning-outcome", path, &mut errors);

    let tree = parse_blocks(
        parsed.body,
        parsed.body_line,
        &LEARNING_OUTCOME_GRAMMAR,
        path,
        &mut errors,
    );
    let lenses: Vec<_> = tree
        .blocks
        .iter()
        .filter(|b| b.kind == "Lens")
        .filter_map(|b| lens_ref(b, path, &mut errors))
        .collect();

    if lenses.is_empty() {
        errors.push(
            ContentError::warning(path, "Learning outcome has no lens references")
                .at_line(parsed.body_line)
                .with_suggestion("## Lens:\nsource:: [[../Lenses/...]]"),
        );
    }

    ParseOutcome::new(
        Some(LearningOutcomeDoc {
            path: path.to_string(),
            id,
            statement,
            lenses,
        }),
        errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_learning_outcome() {
        let content = r#"---
id: 0b8e6f0e-7a51-4c39-a0e4-6a8c2c3f1d2e
learning-outcome: Explain why alignment is hard
---
## Lens:
source:: [[../Lenses/Specification gaming]]

## Test:
Some quiz text.

## Lens:
source:: [[../Lenses/Reward hacking]]
optional:: yes
"#;
        let outcome = parse_learning_outcome(content, "Learning Outcomes/alignment.md");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let lo = outcome.document.unwrap();
        assert_eq!(lo.statement.as_deref(), Some("Explain why alignment is hard"));
        assert_eq!(lo.lenses.len(), 2);
        assert!(!lo.lenses[0].optional);
        assert!(lo.lenses[1].optional);
        assert_eq!(lo.lenses[1].link.line, 12);
    }

    #[test]
    fn test_missing_id_still_returns_document() {
        let outcome = parse_learning_outcome(
            "## Lens:\nsource:: [[../Lenses/a]]\n",
            "Learning Outcomes/x.md",
        );
        assert!(outcome.document.is_some());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].is_error());
    }

    #[test]
    fn test_no_lenses_is_warning() {
        let outcome = parse_learning_outcome(
            "---\nid: 0b8e6f0e-7a51-4c39-a0e4-6a8c2c3f1d2e\n---\n",
            "Learning Outcomes/x.md",
        );
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].is_warning());
    }
}
