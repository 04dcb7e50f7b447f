//! Integrity of the final flattened output.
//!
//! Runs on what the flattener produced, independently of how it was
//! produced, and reports against the module's file path.

use coursemark_types::{ContentError, FlattenedModule};

/// Flag empty modules, empty sections and blank segments
///
/// `modules` pairs each flattened module with the file it came from.
/// Modules whose `error` is already set are not flagged as empty again.
pub fn validate_output(modules: &[(String, FlattenedModule)]) -> Vec<ContentError> {
    let mut errors = Vec::new();
    for (path, module) in modules {
        if module.sections.is_empty() {
            if module.error.is_none() {
                errors.push(ContentError::error(
                    path,
                    format!("Module '{}' has no sections", module.slug),
                ));
            }
            continue;
        }

        for (i, section) in module.sections.iter().enumerate() {
            if section.segments.is_empty() {
                errors.push(ContentError::error(
                    path,
                    format!(
                        "Section {} ('{}') in module '{}' has no segments",
                        i + 1,
                        section.label(),
                        module.slug
                    ),
                ));
                continue;
            }
            for (j, segment) in section.segments.iter().enumerate() {
                if segment.primary_text().trim().is_empty() {
                    errors.push(ContentError::error(
                        path,
                        format!(
                            "Segment {} ({}) of section {} ('{}') in module '{}' has an empty {}",
                            j + 1,
                            segment.kind_name(),
                            i + 1,
                            section.label(),
                            module.slug,
                            segment.primary_field()
                        ),
                    ));
                }
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursemark_types::{Section, SectionKind, SectionMeta, Segment};

    fn module(sections: Vec<Section>) -> FlattenedModule {
        FlattenedModule {
            slug: "intro".into(),
            title: "Intro".into(),
            content_id: None,
            sections,
            error: None,
            warnings: vec![],
        }
    }

    #[test]
    fn test_reports_real_path() {
        let mut empty = Section::new(SectionKind::Page, SectionMeta::default());
        empty.meta.title = Some("Welcome".into());
        let mut blank = Section::new(SectionKind::Text, SectionMeta::default());
        blank.segments.push(Segment::Text {
            content: "  \n".into(),
        });

        let errors = validate_output(&[("modules/01-intro.md".into(), module(vec![empty, blank]))]);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.file == "modules/01-intro.md"));
        assert!(errors[0].message.contains("'Welcome'"));
        assert!(errors[1].message.contains("empty content"));
    }

    #[test]
    fn test_empty_module_flagged_unless_already_errored() {
        let errors = validate_output(&[("modules/a.md".into(), module(vec![]))]);
        assert_eq!(errors.len(), 1);

        let mut errored = module(vec![]);
        errored.error = Some("Module produced no sections".into());
        assert!(validate_output(&[("modules/a.md".into(), errored)]).is_empty());
    }

    #[test]
    fn test_healthy_module_passes() {
        let mut section = Section::new(SectionKind::Chat, SectionMeta::default());
        section.segments.push(Segment::Chat {
            instructions: "Discuss".into(),
            hide_previous_content_from_user: false,
            hide_previous_content_from_tutor: false,
        });
        assert!(validate_output(&[("modules/a.md".into(), module(vec![section]))]).is_empty());
    }
}
