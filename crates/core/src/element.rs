use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Semantic role of a layout unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Paragraph,
    FieldBlock,
    SignatureBlock,
    Heading,
    Spacer,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Paragraph => write!(f, "paragraph"),
            ElementKind::FieldBlock => write!(f, "field-block"),
            ElementKind::SignatureBlock => write!(f, "signature-block"),
            ElementKind::Heading => write!(f, "heading"),
            ElementKind::Spacer => write!(f, "spacer"),
        }
    }
}

/// Typographic parameters handed to the measurer, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_size: f32,
    /// Line advance as a multiple of the font size.
    pub line_height: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            line_height: 1.2,
            space_before: 0.0,
            space_after: 6.0,
            bold: false,
        }
    }
}

impl TextStyle {
    /// House style for each element kind.
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Heading => Self {
                font_size: 14.0,
                space_before: 12.0,
                bold: true,
                ..Self::default()
            },
            ElementKind::SignatureBlock => Self {
                space_before: 18.0,
                space_after: 12.0,
                ..Self::default()
            },
            ElementKind::Spacer => Self {
                space_after: 12.0,
                ..Self::default()
            },
            ElementKind::Paragraph | ElementKind::FieldBlock => Self::default(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(format!("font size must be positive, got {}", self.font_size));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(format!(
                "line height must be positive, got {}",
                self.line_height
            ));
        }
        for (name, value) in [
            ("space before", self.space_before),
            ("space after", self.space_after),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be zero or positive, got {}", name, value));
            }
        }
        Ok(())
    }
}

/// Page-break constraints carried by an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDirectives {
    /// Share a page with the element that follows.
    pub keep_with_next: bool,
    /// Never split; the element is placed whole.
    pub keep_together: bool,
    /// Start a new page before this element unless the page is still empty.
    pub break_before: bool,
}

/// One unit of layout.
///
/// Elements are immutable values; the paginator clones them into the pages
/// it returns and never mutates the input list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentElement {
    pub kind: ElementKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub directives: LayoutDirectives,
}

impl ContentElement {
    /// An element with the house style and default directives for its kind.
    ///
    /// Headings keep with the next element; signature and field blocks are
    /// kept together.
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        let directives = LayoutDirectives {
            keep_with_next: kind == ElementKind::Heading,
            keep_together: matches!(kind, ElementKind::SignatureBlock | ElementKind::FieldBlock),
            break_before: false,
        };
        ContentElement {
            kind,
            text: text.into(),
            style: TextStyle::for_kind(kind),
            directives,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Paragraph, text)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Heading, text)
    }

    pub fn field_block(text: impl Into<String>) -> Self {
        Self::new(ElementKind::FieldBlock, text)
    }

    pub fn signature_block(text: impl Into<String>) -> Self {
        Self::new(ElementKind::SignatureBlock, text)
    }

    pub fn spacer() -> Self {
        Self::new(ElementKind::Spacer, "")
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn keep_with_next(mut self, value: bool) -> Self {
        self.directives.keep_with_next = value;
        self
    }

    pub fn keep_together(mut self, value: bool) -> Self {
        self.directives.keep_together = value;
        self
    }

    pub fn break_before(mut self, value: bool) -> Self {
        self.directives.break_before = value;
        self
    }

    /// Reject elements whose style the measurer cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.style
            .validate()
            .map_err(|msg| EngineError::InvalidInput(format!("{} element: {}", self.kind, msg)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_defaults() {
        assert!(ContentElement::heading("Terms").directives.keep_with_next);
        assert!(ContentElement::signature_block("Sign").directives.keep_together);
        assert!(ContentElement::field_block("Name: ____").directives.keep_together);

        let p = ContentElement::paragraph("Body");
        assert_eq!(p.directives, LayoutDirectives::default());
        assert!(ContentElement::heading("Terms").style.bold);
    }

    #[test]
    fn test_builders() {
        let el = ContentElement::paragraph("x")
            .keep_with_next(true)
            .break_before(true);
        assert!(el.directives.keep_with_next);
        assert!(el.directives.break_before);
        assert!(!el.directives.keep_together);
    }

    #[test]
    fn test_validate_style() {
        assert!(ContentElement::paragraph("ok").validate().is_ok());

        let bad = ContentElement::paragraph("x").with_style(TextStyle {
            font_size: 0.0,
            ..TextStyle::default()
        });
        assert!(matches!(bad.validate(), Err(EngineError::InvalidInput(_))));

        let negative = ContentElement::paragraph("x").with_style(TextStyle {
            space_after: -1.0,
            ..TextStyle::default()
        });
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let el: ContentElement =
            serde_json::from_str(r#"{"kind":"signature_block","text":"Sign here"}"#).unwrap();
        assert_eq!(el.kind, ElementKind::SignatureBlock);
        assert_eq!(el.style, TextStyle::default());
        assert!(!el.directives.keep_together);

        let el: ContentElement = serde_json::from_str(
            r#"{"kind":"heading","directives":{"keep_with_next":true}}"#,
        )
        .unwrap();
        assert!(el.directives.keep_with_next);
        assert!(el.text.is_empty());
    }
}
