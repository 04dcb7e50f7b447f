//! Header blocks and `name:: value` field lines in document bodies.
//!
//! Structured content is written as markdown headers that name a block type
//! (`# Page: Welcome`, `## Lens:`, `#### Article-excerpt`) followed by field
//! lines. A field with nothing after the `::` takes the following lines, up to
//! the next field or structural header, as a multi-line value.

use coursemark_types::ContentError;
use regex::Regex;
use std::sync::OnceLock;

/// Field names recognised anywhere in content bodies. Used to spot
/// `name: value` lines that were meant to be `name:: value`.
pub const KNOWN_FIELDS: &[&str] = &[
    "source",
    "from",
    "to",
    "optional",
    "content",
    "instructions",
    "id",
    "hidePreviousContentFromUser",
    "hidePreviousContentFromTutor",
    "assessmentInstructions",
    "maxTime",
    "maxChars",
    "enforceVoice",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    /// 1-based line of the `name::` line
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub level: usize,
    /// Block keyword as written in the grammar (e.g. "Learning Outcome")
    pub kind: String,
    /// Text after the colon, trimmed
    pub title: String,
    pub line: usize,
    pub fields: Vec<Field>,
    pub children: Vec<Block>,
}

impl Block {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Non-empty field value
    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name)
            .map(|f| f.value.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Boolean field; unparseable values are reported and read as `false`
    pub fn flag(&self, name: &str, path: &str, errors: &mut Vec<ContentError>) -> bool {
        let Some(field) = self.field(name) else {
            return false;
        };
        match parse_bool(&field.value) {
            Some(b) => b,
            None => {
                errors.push(
                    ContentError::warning(
                        path,
                        format!(
                            "Field '{}' expects true or false, got '{}'",
                            field.name, field.value
                        ),
                    )
                    .at_line(field.line),
                );
                false
            }
        }
    }

    pub fn title_or_none(&self) -> Option<String> {
        let title = self.title.trim();
        (!title.is_empty()).then(|| title.to_string())
    }
}

/// Grammar of one document kind's body
pub struct BlockGrammar<'a> {
    /// Header levels that open blocks, outermost first (e.g. `[1, 2]`)
    pub levels: &'a [usize],
    /// Keywords recognised as block types, matched case-insensitively
    pub keywords: &'a [&'a str],
}

/// Result of splitting a body into blocks
#[derive(Debug, Default)]
pub struct BlockTree {
    /// Fields written before the first header
    pub preamble: Vec<Field>,
    pub blocks: Vec<Block>,
}

static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static FIELD_REGEX: OnceLock<Regex> = OnceLock::new();
static SINGLE_COLON_REGEX: OnceLock<Regex> = OnceLock::new();
static NO_SPACE_HEADER_REGEX: OnceLock<Regex> = OnceLock::new();

fn header_regex() -> &'static Regex {
    HEADER_REGEX.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").unwrap())
}

fn field_regex() -> &'static Regex {
    FIELD_REGEX.get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)::(.*)$").unwrap())
}

fn single_colon_regex() -> &'static Regex {
    SINGLE_COLON_REGEX.get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*):(\s.*|)$").unwrap())
}

fn no_space_header_regex() -> &'static Regex {
    NO_SPACE_HEADER_REGEX.get_or_init(|| Regex::new(r"^(#{1,6})([A-Za-z].*)$").unwrap())
}

/// Split a header's text into (kind, title)
fn split_header(text: &str) -> (&str, &str) {
    match text.split_once(':') {
        Some((kind, title)) => (kind.trim(), title.trim()),
        None => (text.trim(), ""),
    }
}

fn is_block_word(kind: &str) -> bool {
    !kind.is_empty()
        && kind.len() <= 40
        && kind.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && kind
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '-')
}

/// Parse a document body into blocks
///
/// A header is structural when its level is one of the grammar's levels and
/// its text either names a known keyword or has the `Word:` shape. Other
/// headers are ordinary markdown and stay inside multi-line field values.
pub fn parse_blocks(
    body: &str,
    first_line: usize,
    grammar: &BlockGrammar<'_>,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> BlockTree {
    let mut tree = BlockTree::default();
    // Open blocks, outermost first
    let mut open: Vec<Block> = Vec::new();
    // The last field pushed is still taking continuation lines
    let mut collecting = false;

    for (offset, raw_line) in body.lines().enumerate() {
        let line_no = first_line + offset;
        let line = raw_line.trim_end();

        if let Some((level, kind, title, known)) = structural_header(line, grammar) {
            let Some(depth) = grammar.levels.iter().position(|l| *l == level) else {
                continue;
            };
            collecting = false;

            if !known {
                errors.push(
                    ContentError::error(
                        path,
                        format!(
                            "Unknown section type '{}'. Expected one of: {}",
                            kind,
                            grammar.keywords.join(", ")
                        ),
                    )
                    .at_line(line_no),
                );
            }

            close_to_depth(&mut open, &mut tree, depth);
            if open.len() < depth {
                errors.push(
                    ContentError::error(
                        path,
                        format!(
                            "'{}' header at level {} has no enclosing section",
                            kind, level
                        ),
                    )
                    .at_line(line_no),
                );
            }
            open.push(Block {
                level,
                kind,
                title,
                line: line_no,
                fields: Vec::new(),
                children: Vec::new(),
            });
            continue;
        }

        if !collecting {
            if let Some(caps) = no_space_header_regex().captures(line) {
                let (kind, _) = split_header(&caps[2]);
                if grammar
                    .keywords
                    .iter()
                    .any(|k| k.eq_ignore_ascii_case(kind))
                {
                    errors.push(
                        ContentError::warning(
                            path,
                            format!("Malformed header '{}': missing space after '#'", line),
                        )
                        .at_line(line_no)
                        .with_suggestion(format!("{} {}", &caps[1], &caps[2])),
                    );
                }
            }
        }

        if let Some(caps) = field_regex().captures(line) {
            let name = caps[1].to_string();
            let value = caps[2].trim().to_string();
            collecting = value.is_empty();
            push_field(&mut open, &mut tree, name, value, line_no);
            continue;
        }

        if collecting {
            if let Some(field) = current_fields(&mut open, &mut tree).last_mut() {
                if !field.value.is_empty() || !line.trim().is_empty() {
                    if !field.value.is_empty() {
                        field.value.push('\n');
                    }
                    field.value.push_str(line);
                }
            }
            continue;
        }

        if let Some(caps) = single_colon_regex().captures(line) {
            let name = &caps[1];
            let value = caps[2].trim();
            let is_known = KNOWN_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(name));
            if is_known && !value.starts_with("//") {
                errors.push(
                    ContentError::warning(
                        path,
                        format!("Field '{}' uses a single colon; fields need '::'", name),
                    )
                    .at_line(line_no)
                    .with_suggestion(format!("{}:: {}", name, value)),
                );
                collecting = value.is_empty();
                push_field(&mut open, &mut tree, name.to_string(), value.to_string(), line_no);
            }
        }
    }

    close_to_depth(&mut open, &mut tree, 0);

    // Multi-line values keep inner blank lines but not trailing ones
    for field in tree.preamble.iter_mut() {
        trim_value(field);
    }
    for block in tree.blocks.iter_mut() {
        trim_block(block);
    }
    tree
}

fn structural_header(
    line: &str,
    grammar: &BlockGrammar<'_>,
) -> Option<(usize, String, String, bool)> {
    let caps = header_regex().captures(line)?;
    let level = caps[1].len();
    if !grammar.levels.contains(&level) {
        return None;
    }
    let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let (kind, title) = split_header(text);

    if let Some(keyword) = grammar
        .keywords
        .iter()
        .find(|k| k.eq_ignore_ascii_case(kind))
    {
        return Some((level, keyword.to_string(), title.to_string(), true));
    }
    if text.contains(':') && is_block_word(kind) {
        return Some((level, kind.to_string(), title.to_string(), false));
    }
    None
}

fn close_to_depth(open: &mut Vec<Block>, tree: &mut BlockTree, depth: usize) {
    while open.len() > depth {
        let Some(block) = open.pop() else {
            break;
        };
        match open.last_mut() {
            Some(parent) => parent.children.push(block),
            None => tree.blocks.push(block),
        }
    }
}

fn current_fields<'a>(open: &'a mut [Block], tree: &'a mut BlockTree) -> &'a mut Vec<Field> {
    match open.last_mut() {
        Some(block) => &mut block.fields,
        None => &mut tree.preamble,
    }
}

fn push_field(open: &mut [Block], tree: &mut BlockTree, name: String, value: String, line: usize) {
    current_fields(open, tree).push(Field { name, value, line });
}

fn trim_value(field: &mut Field) {
    let trimmed = field.value.trim();
    if trimmed.len() != field.value.len() {
        field.value = trimmed.to_string();
    }
}

fn trim_block(block: &mut Block) {
    for field in block.fields.iter_mut() {
        trim_value(field);
    }
    for child in block.children.iter_mut() {
        trim_block(child);
    }
}

/// Parse `true/false/yes/no`, case-insensitively
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// Strip one layer of straight or curly quotes
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    let pairs = [('"', '"'), ('\'', '\''), ('\u{201C}', '\u{201D}'), ('\u{2018}', '\u{2019}')];
    for (open, close) in pairs {
        if value.len() >= open.len_utf8() + close.len_utf8()
            && value.starts_with(open)
            && value.ends_with(close)
        {
            return &value[open.len_utf8()..value.len() - close.len_utf8()];
        }
    }
    value
}
