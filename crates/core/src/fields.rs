//! Fillable-field detection
//!
//! Locates blanks in plain document text and classifies them. Recognizers run
//! in a fixed priority order (signature, date, currency, checkbox, then a
//! generic catch-all). Every recognizer scans the whole text, and a match is
//! kept only when its span is still unclaimed, so a later, lower-priority
//! recognizer can never double-count a region an earlier one took.
//!
//! ```text
//! "Signature: ____\nDate: ____\nAmount: $____"
//!      signature       date        currency
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config::ExtractorConfig;
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Category of a detected field, in recognizer priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Signature,
    Date,
    Currency,
    Checkbox,
    GenericBlank,
}

impl FieldKind {
    pub const PRIORITY: [FieldKind; 5] = [
        FieldKind::Signature,
        FieldKind::Date,
        FieldKind::Currency,
        FieldKind::Checkbox,
        FieldKind::GenericBlank,
    ];
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Signature => write!(f, "signature"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Currency => write!(f, "currency"),
            FieldKind::Checkbox => write!(f, "checkbox"),
            FieldKind::GenericBlank => write!(f, "generic-blank"),
        }
    }
}

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        SourceSpan { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A fillable region found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    pub kind: FieldKind,
    /// Caption plus blank (for checkboxes: the box glyph).
    pub span: SourceSpan,
    /// The part of `span` a filled-in value replaces.
    pub blank: SourceSpan,
    pub required: bool,
}

/// Non-fatal findings reported next to the extracted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// A blank with no usable caption; the field was kept with an empty label.
    EmptyLabel { span: SourceSpan },
    /// The caption names more than one category; the highest-priority one won.
    AmbiguousLabel {
        span: SourceSpan,
        label: String,
        kinds: Vec<FieldKind>,
    },
}

impl ExtractionWarning {
    pub fn span(&self) -> SourceSpan {
        match self {
            ExtractionWarning::EmptyLabel { span } => *span,
            ExtractionWarning::AmbiguousLabel { span, .. } => *span,
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::EmptyLabel { span } => {
                write!(f, "blank at {} has no label", span)
            }
            ExtractionWarning::AmbiguousLabel { span, label, kinds } => {
                let kinds: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                write!(
                    f,
                    "label '{}' at {} matches several kinds ({})",
                    label,
                    span,
                    kinds.join(", ")
                )
            }
        }
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub fields: Vec<Field>,
    pub warnings: Vec<ExtractionWarning>,
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Characters a caption may contain: anything on the line except blank
/// markers and checkbox glyphs.
const LABEL_CHAR: &str = r"[^\n_*\[\]☐☑☒]";

const SIGNATURE_KEYWORDS: &str = r"signature|signed|sign\s+here|signatory|initials?";
const DATE_KEYWORDS: &str = r"date[sd]?|dob|birth\w*";
const CURRENCY_KEYWORDS: &str =
    r"amount|price|fees?|total|costs?|payments?|salary|rent|deposit|sum";

/// One regular expression of a recognizer.
///
/// Named groups: `label` (caption), `blank` (the fillable part).
#[derive(Debug)]
struct Pattern {
    regex: Regex,
    /// When set, the clipped caption itself must still contain a keyword.
    keywords: Option<Regex>,
}

#[derive(Debug)]
struct Recognizer {
    kind: FieldKind,
    patterns: Vec<Pattern>,
}

fn keyword_regex(keywords: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b(?:{keywords})\b"))
}

/// Caption containing one of `keywords`.
///
/// Unanchored: `_` is a word character, so a caption right after a blank
/// (`Name:____Date:____`) has no word boundary in front of it. Whole-word
/// matching happens on the clipped caption instead.
fn keyword_label(keywords: &str) -> String {
    format!(r"{LABEL_CHAR}*?(?:{keywords}){LABEL_CHAR}*?")
}

/// Caption followed by a run of underscores/asterisks, and caption followed by
/// a colon and trailing whitespace up to the end of the line.
fn label_blank_patterns(
    label: &str,
    min_blank: usize,
    keywords: Option<&str>,
) -> Result<Vec<Pattern>, regex::Error> {
    let marked = format!(
        r"(?im)(?P<label>{label})[ \t]*[:\-]?[ \t]*(?P<blank>_{{{min_blank},}}|\*{{{min_blank},}})"
    );
    let trailing =
        format!(r"(?im)(?P<label>{label})[ \t]*:(?P<blank>[ \t]{{{min_blank},}})\r?$");

    let mut patterns = Vec::with_capacity(2);
    for source in [marked, trailing] {
        patterns.push(Pattern {
            regex: Regex::new(&source)?,
            keywords: keywords.map(keyword_regex).transpose()?,
        });
    }
    Ok(patterns)
}

fn build_recognizers(config: &ExtractorConfig) -> Result<Vec<Recognizer>, regex::Error> {
    let n = config.min_blank_len;
    let any_label = format!("{LABEL_CHAR}*?");

    let signature = label_blank_patterns(
        &keyword_label(SIGNATURE_KEYWORDS),
        n,
        Some(SIGNATURE_KEYWORDS),
    )?;

    // `__/__/____` is a date whatever its caption says.
    let mut date = vec![Pattern {
        regex: Regex::new(&format!(
            r"(?im)(?P<label>{LABEL_CHAR}*?)[ \t]*[:\-]?[ \t]*(?P<blank>_{{2,}}[ \t]*/[ \t]*_{{2,}}[ \t]*/[ \t]*_{{2,}})"
        ))?,
        keywords: None,
    }];
    date.extend(label_blank_patterns(
        &keyword_label(DATE_KEYWORDS),
        n,
        Some(DATE_KEYWORDS),
    )?);

    let mut currency = vec![Pattern {
        regex: Regex::new(&format!(
            r"(?im)(?P<label>{any_label})[ \t]*[:\-]?[ \t]*(?P<blank>[$€£][ \t]*(?:_{{{n},}}|\*{{{n},}}))"
        ))?,
        keywords: None,
    }];
    currency.extend(label_blank_patterns(
        &keyword_label(CURRENCY_KEYWORDS),
        n,
        Some(CURRENCY_KEYWORDS),
    )?);

    let checkbox = vec![Pattern {
        regex: Regex::new(r"(?m)(?P<blank>\[[ \t]?\]|\[[xX✓✔]\]|[☐☑☒])[ \t]*(?P<label>[^\n_*\[\]☐☑☒]*)")?,
        keywords: None,
    }];

    let generic = label_blank_patterns(&any_label, n, None)?;

    Ok(vec![
        Recognizer {
            kind: FieldKind::Signature,
            patterns: signature,
        },
        Recognizer {
            kind: FieldKind::Date,
            patterns: date,
        },
        Recognizer {
            kind: FieldKind::Currency,
            patterns: currency,
        },
        Recognizer {
            kind: FieldKind::Checkbox,
            patterns: checkbox,
        },
        Recognizer {
            kind: FieldKind::GenericBlank,
            patterns: generic,
        },
    ])
}

// ---------------------------------------------------------------------------
// Claim set
// ---------------------------------------------------------------------------

/// Non-overlapping spans already taken, keyed by start offset.
#[derive(Debug, Default)]
struct ClaimSet {
    spans: BTreeMap<usize, usize>,
}

impl ClaimSet {
    /// Claim `span` unless it overlaps an existing claim.
    ///
    /// Claims never overlap each other, so the claim with the greatest start
    /// before `span.end` is the only one that can collide.
    fn claim(&mut self, span: SourceSpan) -> bool {
        if let Some((_, &end)) = self.spans.range(..span.end).next_back() {
            if end > span.start {
                return false;
            }
        }
        // Zero-length spans still need a slot of their own.
        if span.is_empty() && self.spans.contains_key(&span.start) {
            return false;
        }
        self.spans.insert(span.start, span.end);
        true
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Compiled recognizers for one [`ExtractorConfig`].
///
/// Holds no per-document state; share it freely between threads.
#[derive(Debug)]
pub struct FieldExtractor {
    recognizers: Vec<Recognizer>,
    classifiers: Vec<(FieldKind, Regex)>,
    min_label_len: usize,
}

impl FieldExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, EngineError> {
        if config.min_blank_len == 0 {
            return Err(EngineError::Config(
                "min_blank_len must be at least 1".to_string(),
            ));
        }

        Ok(FieldExtractor {
            recognizers: build_recognizers(config)?,
            classifiers: vec![
                (FieldKind::Signature, keyword_regex(SIGNATURE_KEYWORDS)?),
                (FieldKind::Date, keyword_regex(DATE_KEYWORDS)?),
                (FieldKind::Currency, keyword_regex(CURRENCY_KEYWORDS)?),
            ],
            min_label_len: config.min_label_len,
        })
    }

    /// Detect every field in `text`, ordered by position.
    pub fn extract(&self, text: &str) -> Extraction {
        let mut claims = ClaimSet::default();
        let mut extraction = Extraction::default();

        for recognizer in &self.recognizers {
            for pattern in &recognizer.patterns {
                for caps in pattern.regex.captures_iter(text) {
                    let Some(field) = self.candidate(text, recognizer.kind, pattern, &caps) else {
                        continue;
                    };
                    if !claims.claim(field.span) {
                        continue;
                    }
                    extraction.warnings.extend(self.label_warnings(&field));
                    extraction.fields.push(field);
                }
            }
        }

        extraction.fields.sort_by_key(|f| f.span.start);
        extraction.warnings.sort_by_key(|w| w.span().start);

        log::debug!(
            "extracted {} fields ({} warnings) from {} bytes",
            extraction.fields.len(),
            extraction.warnings.len(),
            text.len()
        );

        extraction
    }

    /// Turn one regex match into a field, or `None` when the caption left
    /// after clipping no longer qualifies for this recognizer.
    fn candidate(
        &self,
        text: &str,
        kind: FieldKind,
        pattern: &Pattern,
        caps: &Captures,
    ) -> Option<Field> {
        let blank = caps.name("blank")?;
        let raw_label = caps.name("label").map(|m| (m.start(), m.as_str()));

        let (label_start, label_text) = match raw_label {
            Some((offset, raw)) if kind != FieldKind::Checkbox => {
                let kept = sentence_start(raw);
                let clipped = &raw[kept..];
                let lead = clipped.len() - clipped.trim_start().len();
                (Some(offset + kept + lead), clipped)
            }
            Some((offset, raw)) => (None, checkbox_caption(raw, &text[offset + raw.len()..])),
            None => (None, ""),
        };

        if let Some(keywords) = &pattern.keywords {
            if !keywords.is_match(label_text) {
                return None;
            }
        }

        let (mut label, required) = normalize_label(label_text);
        if word_chars(&label) < self.min_label_len.max(1) {
            label.clear();
        }

        let blank_span = SourceSpan::new(blank.start(), blank.end());
        let span = match label_start {
            Some(start) if !label.is_empty() => SourceSpan::new(start, blank.end()),
            _ => blank_span,
        };

        Some(Field {
            label,
            kind,
            span,
            blank: blank_span,
            required,
        })
    }

    fn label_warnings(&self, field: &Field) -> Vec<ExtractionWarning> {
        if field.label.is_empty() {
            return vec![ExtractionWarning::EmptyLabel { span: field.span }];
        }

        let kinds: Vec<FieldKind> = self
            .classifiers
            .iter()
            .filter(|(_, re)| re.is_match(&field.label))
            .map(|(kind, _)| *kind)
            .collect();

        if kinds.len() > 1 {
            vec![ExtractionWarning::AmbiguousLabel {
                span: field.span,
                label: field.label.clone(),
                kinds,
            }]
        } else {
            Vec::new()
        }
    }
}

/// Detect fields with the default configuration.
pub fn extract(text: &str) -> Vec<Field> {
    default_extractor().extract(text).fields
}

fn default_extractor() -> &'static FieldExtractor {
    static DEFAULT: OnceLock<FieldExtractor> = OnceLock::new();
    DEFAULT.get_or_init(|| FieldExtractor::new(&ExtractorConfig::default()).unwrap())
}

// ---------------------------------------------------------------------------
// Label helpers
// ---------------------------------------------------------------------------

/// Words that end in a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "jr", "sr", "st", "no", "vs", "etc", "inc", "ltd", "co",
    "e.g", "i.e",
];

/// Byte offset where the last sentence of a caption begins.
///
/// Keeps "Signature" out of "I accept the terms. Signature", but not
/// "Smith" out of "Mr. Smith signature": titles, initials and other
/// abbreviations do not end a sentence.
fn sentence_start(raw: &str) -> usize {
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        let next = i + c.len_utf8();
        if !matches!(c, '.' | ';' | '!' | '?') || !raw[next..].starts_with(char::is_whitespace) {
            continue;
        }
        if c == '.' && is_abbreviation(&raw[..i]) {
            continue;
        }
        start = next;
    }
    start
}

/// Whether the word ending `before` (a period follows it) is an abbreviation.
fn is_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("");
    if word.chars().count() == 1 && word.chars().all(char::is_alphabetic) {
        return true;
    }
    let word = word.to_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
}

/// Caption of a checkbox, given the raw text after the box and what follows.
///
/// When the caption runs into another blank on the same line, the last
/// sentence belongs to that blank's field and is cut off:
/// `[ ] I agree to the terms. Signature: ____` captions the box
/// "I agree to the terms". A caption that is a single sentence
/// (`[ ] Other: ____`) is shared by the box and the blank.
fn checkbox_caption<'t>(raw: &'t str, rest: &str) -> &'t str {
    if !rest.starts_with(['_', '*']) {
        return raw;
    }
    match sentence_start(raw) {
        0 => raw,
        cut => raw[..cut].trim_end().trim_end_matches(['.', ';', '!', '?']),
    }
}

/// Trim, compose, collapse whitespace and drop trailing separators.
///
/// Returns the label and whether the field is required; an `(optional)`
/// marker clears the flag and is removed from the label.
pub fn normalize_label(raw: &str) -> (String, bool) {
    static OPTIONAL: OnceLock<Regex> = OnceLock::new();
    let optional = OPTIONAL.get_or_init(|| Regex::new(r"(?i)\(\s*optional\s*\)").unwrap());

    let composed: String = raw.nfc().collect();
    let required = !optional.is_match(&composed);
    let stripped = optional.replace_all(&composed, " ");

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let label = collapsed
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, ':' | '-' | '–' | ',' | '$' | '€' | '£')
        })
        .to_string();

    (label, required)
}

fn word_chars(label: &str) -> usize {
    label.chars().filter(|c| c.is_alphanumeric()).count()
}
