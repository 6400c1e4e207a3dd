//! Template filling and element building
//!
//! Glue between extraction and pagination: merges form values into the
//! blanks the extractor found and cuts the filled text into layout elements
//! carrying the directives the paginator honors.
//!
//! Block rules, one element per block:
//!
//! - `# `, `## `, `### ` lines and short ALL-CAPS blocks become headings
//!   (kept with the next element);
//! - a block holding a signature field becomes a signature block, any other
//!   block holding fields a field block (both kept together);
//! - everything else is a paragraph, its lines reflowed;
//! - a `---` line (or a line of form feeds) forces a page break before the
//!   next element;
//! - two or more empty lines in a row insert a spacer.

use std::collections::{BTreeMap, BTreeSet};

use crate::element::{ContentElement, ElementKind, TextStyle};
use crate::error::EngineError;
use crate::fields::{normalize_label, Field, FieldKind, SourceSpan};

/// Longest line still treated as an ALL-CAPS heading.
const MAX_CAPS_HEADING_CHARS: usize = 60;

/// Form data keyed by field label.
///
/// Keys are matched the way labels are normalized, case-insensitively, so
/// `"full  name:"` finds the field labeled `Full name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of `label -> value` strings.
    pub fn from_json_str(source: &str) -> Result<Self, EngineError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(source)?;
        Ok(raw.into_iter().collect())
    }

    pub fn insert(&mut self, label: impl AsRef<str>, value: impl Into<String>) {
        self.values.insert(value_key(label.as_ref()), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(&value_key(label)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FormValues::new();
        for (label, value) in iter {
            values.insert(label, value);
        }
        values
    }
}

fn value_key(label: &str) -> String {
    normalize_label(label).0.to_lowercase()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "x" | "yes" | "y" | "true" | "1" | "on" | "checked"
    )
}

/// Required fields that have no value.
pub fn missing_required<'a>(fields: &'a [Field], values: &FormValues) -> Vec<&'a Field> {
    fields
        .iter()
        .filter(|f| f.required && f.kind != FieldKind::Checkbox)
        .filter(|f| values.get(&f.label).is_none())
        .collect()
}

/// Replace each field's blank with its value.
///
/// Fields without a value keep their blank. A checkbox sharing its label
/// with a text blank (`[ ] Other: ____`) is ticked whenever that blank gets
/// a value. Fails when a field's blank does not lie on character boundaries
/// of `text` or two blanks overlap.
pub fn fill_text(text: &str, fields: &[Field], values: &FormValues) -> Result<String, EngineError> {
    let detailed: BTreeSet<String> = fields
        .iter()
        .filter(|f| f.kind != FieldKind::Checkbox && !f.label.is_empty())
        .map(|f| value_key(&f.label))
        .collect();

    let mut ordered: Vec<&Field> = fields.iter().collect();
    ordered.sort_by_key(|f| f.blank.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for field in ordered {
        let SourceSpan { start, end } = field.blank;
        if start < cursor {
            return Err(EngineError::InvalidInput(format!(
                "field '{}' at {} overlaps a previous field",
                field.label, field.blank
            )));
        }
        let (Some(before), Some(blank)) = (text.get(cursor..start), text.get(start..end)) else {
            return Err(EngineError::InvalidInput(format!(
                "field '{}' at {} is outside the text",
                field.label, field.blank
            )));
        };

        out.push_str(before);
        match values.get(&field.label) {
            Some(value) if field.kind == FieldKind::Checkbox => {
                let has_detail =
                    detailed.contains(&value_key(&field.label)) && !value.trim().is_empty();
                let checked = is_truthy(value) || has_detail;
                out.push_str(if checked { "[x]" } else { "[ ]" });
            }
            Some(value) => out.push_str(&replacement(blank, value)),
            None => out.push_str(blank),
        }
        cursor = end;
    }

    out.push_str(&text[cursor..]);
    Ok(out)
}

fn replacement(blank: &str, value: &str) -> String {
    let value = value.trim();

    // Trailing-whitespace blank, directly after the label's colon.
    if blank.chars().all(|c| c == ' ' || c == '\t') {
        return format!(" {}", value);
    }

    match blank.chars().next() {
        Some(sign @ ('$' | '€' | '£')) => {
            format!("{}{}", sign, value.trim_start_matches(['$', '€', '£']).trim_start())
        }
        _ => value.to_string(),
    }
}

/// Cut `text` into layout elements with `values` merged in.
pub fn build_elements(
    text: &str,
    fields: &[Field],
    values: &FormValues,
) -> Result<Vec<ContentElement>, EngineError> {
    let mut builder = ElementBuilder {
        text,
        fields,
        values,
        elements: Vec::new(),
        block: None,
        empty_run: 0,
        pending_break: false,
    };

    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);
        builder.line(start, line)?;
    }
    builder.flush()?;

    Ok(builder.elements)
}

struct ElementBuilder<'a> {
    text: &'a str,
    fields: &'a [Field],
    values: &'a FormValues,
    elements: Vec<ContentElement>,
    /// Byte range of the block being collected.
    block: Option<(usize, usize)>,
    empty_run: usize,
    pending_break: bool,
}

impl ElementBuilder<'_> {
    fn line(&mut self, start: usize, line: &str) -> Result<(), EngineError> {
        if is_break_marker(line) {
            self.flush()?;
            self.pending_break = true;
            self.empty_run = 0;
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.flush()?;
            self.empty_run += 1;
            if self.empty_run == 2 && !self.elements.is_empty() {
                self.push(ContentElement::spacer());
            }
            return Ok(());
        }
        self.empty_run = 0;

        if let Some((level, title)) = markdown_heading(trimmed) {
            self.flush()?;
            let style = TextStyle {
                font_size: match level {
                    1 => 16.0,
                    2 => 14.0,
                    _ => 12.0,
                },
                ..TextStyle::for_kind(ElementKind::Heading)
            };
            self.push(ContentElement::heading(title).with_style(style));
            return Ok(());
        }

        let end = start + line.len();
        self.block = Some(match self.block {
            Some((block_start, _)) => (block_start, end),
            None => (start, end),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        let Some((start, end)) = self.block.take() else {
            return Ok(());
        };

        let inside: Vec<Field> = self
            .fields
            .iter()
            .filter(|f| f.span.start >= start && f.span.end <= end)
            .map(|f| Field {
                span: SourceSpan::new(f.span.start - start, f.span.end - start),
                blank: SourceSpan::new(f.blank.start - start, f.blank.end - start),
                ..f.clone()
            })
            .collect();

        let source = &self.text[start..end];
        let filled = fill_text(source, &inside, self.values)?;

        let kind = if inside.iter().any(|f| f.kind == FieldKind::Signature) {
            ElementKind::SignatureBlock
        } else if !inside.is_empty() {
            ElementKind::FieldBlock
        } else if is_caps_heading(source) {
            ElementKind::Heading
        } else {
            ElementKind::Paragraph
        };

        let text = match kind {
            ElementKind::Paragraph | ElementKind::Heading => {
                filled.split_whitespace().collect::<Vec<_>>().join(" ")
            }
            _ => filled
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n"),
        };

        self.push(ContentElement::new(kind, text));
        Ok(())
    }

    fn push(&mut self, element: ContentElement) {
        let element = if self.pending_break {
            self.pending_break = false;
            element.break_before(true)
        } else {
            element
        };
        self.elements.push(element);
    }
}

fn is_break_marker(line: &str) -> bool {
    let marker = line.trim_matches([' ', '\t']);
    marker == "---" || (!marker.is_empty() && marker.chars().all(|c| c == '\u{c}'))
}

fn markdown_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=3).contains(&level) {
        return None;
    }
    let title = line[level..].strip_prefix(' ')?.trim();
    (!title.is_empty()).then_some((level, title))
}

fn is_caps_heading(block: &str) -> bool {
    let line = block.trim();
    !line.contains('\n')
        && line.chars().count() <= MAX_CAPS_HEADING_CHARS
        && line.chars().any(char::is_alphabetic)
        && line
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
        && !line.ends_with('.')
}
