use formpage_core::{ContentElement, ElementKind, Measure, TextStyle};

use crate::metrics::Font;
use crate::wrap::wrap_text;

/// Measures elements by wrapping their text with Helvetica metrics.
///
/// Height is the number of wrapped lines times the line advance, plus the
/// style's space before and after. Spacers contribute their spacing only and
/// signature blocks reserve one extra line for the rule drawn under them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMeasurer;

impl TextMeasurer {
    pub fn new() -> Self {
        TextMeasurer
    }

    /// Lines the element occupies once wrapped to `available_width`.
    pub fn layout_lines(
        &self,
        element: &ContentElement,
        style: &TextStyle,
        available_width: f32,
    ) -> Vec<String> {
        if element.kind == ElementKind::Spacer {
            return Vec::new();
        }
        wrap_text(
            &element.text,
            Font::for_weight(style.bold),
            style.font_size,
            available_width,
        )
    }

    /// Vertical distance between two baselines.
    pub fn leading(style: &TextStyle) -> f32 {
        style.font_size * style.line_height
    }
}

impl Measure for TextMeasurer {
    fn measure(&self, element: &ContentElement, style: &TextStyle, available_width: f32) -> f32 {
        let mut lines = self.layout_lines(element, style, available_width).len();
        if element.kind == ElementKind::SignatureBlock {
            lines += 1;
        }
        lines as f32 * Self::leading(style) + style.space_before + style.space_after
    }
}
