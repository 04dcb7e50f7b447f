//! The content processing pass.
//!
//! Flow: Snapshot → Tiers → Parse → Flatten → Courses → Validators → Result
//!
//! Every piece of pass state (parsed documents, id and slug registries, the
//! tier map) lives inside one call of [`process_content`] and is handed to
//! the sub-steps by reference.

use crate::flatten::{flatten_module, validate_learning_outcome, validate_lens, FlattenContext};
use crate::models::{CourseDoc, CourseItemSpec, Document, DocumentKind};
use crate::parsers::parse_document;
use crate::snapshot::FileSnapshot;
use crate::tiers::{check_tier_violation, classify_tiers, TierMap};
use crate::urls::collect_urls;
use crate::validators::{
    validate_directories, validate_output, validate_slugs, validate_timestamp_pairs,
    validate_uuids, SlugEntry, UuidEntry,
};
use crate::wikilinks::{
    file_stem, find_file_in_snapshot, find_similar_files, format_suggestion, resolve_wikilink,
};
use coursemark_types::{
    ContentError, Course, FlattenedModule, ProcessResult, ProgressionItem, Severity,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Ids and slugs seen during one pass
#[derive(Debug, Default)]
struct Registries {
    uuids: Vec<UuidEntry>,
    module_slugs: Vec<SlugEntry>,
    course_slugs: Vec<SlugEntry>,
    /// Module file path → slug; paths are authoritative when slugs collide
    path_to_slug: BTreeMap<String, String>,
}

impl Registries {
    fn register(&mut self, document: &Document) {
        for id in document.ids() {
            self.uuids.push(UuidEntry {
                uuid: id.value,
                file: document.path().to_string(),
                field: id.field.to_string(),
                line: id.line,
            });
        }
        match document {
            Document::Module(module) => {
                self.module_slugs.push(SlugEntry {
                    slug: module.slug.clone(),
                    file: module.path.clone(),
                    line: module.slug_line,
                });
                self.path_to_slug
                    .insert(module.path.clone(), module.slug.clone());
            }
            Document::Course(course) => {
                self.course_slugs.push(SlugEntry {
                    slug: course.slug.clone(),
                    file: course.path.clone(),
                    line: course.slug_line,
                });
            }
            _ => {}
        }
    }
}

/// Run one full pass over a content snapshot
///
/// Pure: the same snapshot always yields the same result, and one bad file
/// only affects its own output.
pub fn process_content(files: &FileSnapshot) -> ProcessResult {
    let tiers = classify_tiers(files);
    let mut errors = Vec::new();

    let mut documents: BTreeMap<String, Document> = BTreeMap::new();
    for (path, content) in files.iter() {
        let Some(kind) = DocumentKind::from_path(path) else {
            continue;
        };
        if tiers.is_ignored(path) {
            debug!(path, "Skipping ignored file");
            continue;
        }
        debug!(path, kind = kind.label(), "Parsing");
        let outcome = parse_document(kind, content, path);
        errors.extend(outcome.errors);
        if let Some(document) = outcome.document {
            documents.insert(path.to_string(), document);
        }
    }

    let mut registries = Registries::default();
    for document in documents.values() {
        registries.register(document);
    }

    let ctx = FlattenContext::new(files, &documents, &tiers);
    let mut flattened: Vec<(String, FlattenedModule)> = Vec::new();
    for document in documents.values() {
        match document {
            Document::Module(module) => {
                let (result, module_errors) = flatten_module(module, &ctx);
                errors.extend(module_errors);
                flattened.push((module.path.clone(), result));
            }
            Document::Lens(lens) => errors.extend(validate_lens(lens, &ctx)),
            Document::LearningOutcome(lo) => {
                errors.extend(validate_learning_outcome(lo, &ctx))
            }
            _ => {}
        }
    }

    let courses: Vec<Course> = documents
        .values()
        .filter_map(|document| match document {
            Document::Course(course) => Some(resolve_course(
                course,
                files,
                &tiers,
                &registries,
                &mut errors,
            )),
            _ => None,
        })
        .collect();

    errors.extend(validate_uuids(&registries.uuids));
    errors.extend(validate_slugs(&registries.module_slugs, "module"));
    errors.extend(validate_slugs(&registries.course_slugs, "course"));
    errors.extend(validate_timestamp_pairs(files, &tiers));
    errors.extend(validate_output(&flattened));
    errors.extend(validate_directories(files));

    let urls_to_validate = collect_urls(documents.values());

    let errors = tag_categories(dedupe(errors), &tiers);
    let result = ProcessResult {
        modules: flattened.into_iter().map(|(_, module)| module).collect(),
        courses,
        errors,
        urls_to_validate,
    };

    info!(
        files = files.len(),
        modules = result.modules.len(),
        courses = result.courses.len(),
        errors = result.error_count(),
        warnings = result.warning_count(),
        "Processed content"
    );
    result
}

/// Turn a parsed course into its output form, resolving module links to slugs
///
/// Unresolvable, tier-violating and unparseable module references are
/// reported and dropped from the progression; ignored modules are dropped
/// quietly.
fn resolve_course(
    course: &CourseDoc,
    files: &FileSnapshot,
    tiers: &TierMap,
    registries: &Registries,
    errors: &mut Vec<ContentError>,
) -> Course {
    let module_files: Vec<&str> = files
        .paths()
        .filter(|p| DocumentKind::from_path(p) == Some(DocumentKind::Module))
        .collect();

    let mut progression = Vec::new();
    for item in &course.items {
        let (link, optional) = match item {
            CourseItemSpec::Meeting { number } => {
                progression.push(ProgressionItem::Meeting { number: *number });
                continue;
            }
            CourseItemSpec::Module { link, optional } => (link, *optional),
        };

        let resolved = resolve_wikilink(&link.target, &course.path);
        let exact = find_file_in_snapshot(&resolved, files)
            .filter(|path| module_files.contains(&path.as_str()));
        let path = match exact {
            Some(path) => path,
            None => {
                // Module files are flat, so a stem names at most one of them
                let stem = file_stem(&resolved);
                match module_files.iter().find(|p| file_stem(p) == stem) {
                    Some(found) => found.to_string(),
                    None => {
                        let mut error = ContentError::error(
                            &course.path,
                            format!("Referenced module not found: {}", resolved),
                        )
                        .at_line(link.line);
                        let similar = find_similar_files(&resolved, files, Some("modules"));
                        if let Some(suggestion) = format_suggestion(&similar) {
                            error = error.with_suggestion(suggestion);
                        }
                        errors.push(error);
                        continue;
                    }
                }
            }
        };

        let module_tier = tiers.get(&path);
        if tiers.is_ignored(&path) {
            debug!(course = %course.path, module = %path, "Dropping ignored module from course");
            continue;
        }
        if let Some(error) = check_tier_violation(
            &course.path,
            tiers.get(&course.path),
            &path,
            module_tier,
            "module",
            Some(link.line),
        ) {
            errors.push(error);
            continue;
        }
        let Some(slug) = registries.path_to_slug.get(&path) else {
            errors.push(
                ContentError::error(
                    &course.path,
                    format!("Module '{}' could not be parsed and was left out of the course", path),
                )
                .at_line(link.line),
            );
            continue;
        };
        progression.push(ProgressionItem::Module {
            slug: slug.clone(),
            optional,
        });
    }

    Course {
        slug: course.slug.clone(),
        title: course.title.clone(),
        progression,
    }
}

/// Drop repeats of the same located message, keeping first-seen order
fn dedupe(errors: Vec<ContentError>) -> Vec<ContentError> {
    let mut seen: HashSet<(String, Option<usize>, String, Severity)> = HashSet::new();
    errors
        .into_iter()
        .filter(|e| seen.insert((e.file.clone(), e.line, e.message.clone(), e.severity)))
        .collect()
}

fn tag_categories(errors: Vec<ContentError>, tiers: &TierMap) -> Vec<ContentError> {
    errors
        .into_iter()
        .map(|mut error| {
            if error.category.is_none() {
                error.category = tiers.get(&error.file).category();
            }
            error
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursemark_types::ErrorCategory;

    fn snapshot(files: &[(&str, &str)]) -> FileSnapshot {
        files.iter().copied().collect()
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let errors = dedupe(vec![
            ContentError::error("a.md", "x").at_line(1),
            ContentError::error("b.md", "x").at_line(1),
            ContentError::error("a.md", "x").at_line(1),
            ContentError::warning("a.md", "x").at_line(1),
        ]);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[1].file, "b.md");
    }

    #[test]
    fn test_categories_follow_file_tier() {
        let files = snapshot(&[("Lenses/w.md", "---\ntags: [wip]\n---\n")]);
        let tiers = classify_tiers(&files);
        let errors = tag_categories(
            vec![
                ContentError::error("Lenses/w.md", "a"),
                ContentError::error("Lenses/p.md", "b"),
                ContentError::error("Lenses/w.md", "c").with_category(ErrorCategory::Production),
            ],
            &tiers,
        );
        assert_eq!(errors[0].category, Some(ErrorCategory::Wip));
        assert_eq!(errors[1].category, Some(ErrorCategory::Production));
        assert_eq!(errors[2].category, Some(ErrorCategory::Production));
    }

    #[test]
    fn test_course_drops_only_unresolved_items() {
        let files = snapshot(&[
            ("modules/intro.md", "---\nslug: intro\ntitle: Intro\n---\n# Text:\ncontent:: Hello\n"),
            (
                "courses/c.md",
                "---\nslug: c\ntitle: C\n---\n# Module: [[intro]]\n# Meeting: 1\n# Module: [[../modules/intor]]\n",
            ),
        ]);
        let result = process_content(&files);
        let course = result.find_course("c").unwrap();
        assert_eq!(course.module_slugs(), vec!["intro"]);
        assert_eq!(course.progression.len(), 2);

        let missing: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.file == "courses/c.md")
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].line, Some(7));
        assert_eq!(
            missing[0].suggestion.as_deref(),
            Some("Did you mean: modules/intro.md?")
        );
    }
}
