use formpage_core::{ElementKind, Page};

use crate::measure::TextMeasurer;

/// Stand-in for the drawn signature rule in the text preview.
const SIGNATURE_RULE: &str = "______________________________";

/// Render paginated content as plain text, one banner per page.
///
/// Lines are wrapped to `content_width` exactly as the measurer wrapped them,
/// so the preview shows the same line breaks the PDF will have.
pub fn render_pages(pages: &[Page], content_width: f32) -> String {
    let measurer = TextMeasurer::new();
    let total = pages.len();
    let mut output = String::new();

    for page in pages {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!("=== Page {} of {} ===\n\n", page.number, total));

        for placed in &page.elements {
            let element = &placed.element;
            if element.kind == ElementKind::Spacer {
                output.push('\n');
                continue;
            }

            let lines = measurer.layout_lines(element, &element.style, content_width);
            for line in &lines {
                if element.kind == ElementKind::Heading {
                    output.push_str(&line.to_uppercase());
                } else {
                    output.push_str(line);
                }
                output.push('\n');
            }
            if element.kind == ElementKind::SignatureBlock {
                output.push_str(SIGNATURE_RULE);
                output.push('\n');
            }
            output.push('\n');
        }
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formpage_core::{ContentElement, LayoutConfig, Paginator};

    fn paginate(elements: &[ContentElement], height: f32) -> Vec<Page> {
        Paginator::new(LayoutConfig::with_content_height(height))
            .paginate(elements, &TextMeasurer)
            .unwrap()
            .pages
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render_pages(&[], 468.0), "");
    }

    #[test]
    fn test_page_banners() {
        let elements = vec![
            ContentElement::paragraph("First"),
            ContentElement::paragraph("Second").break_before(true),
        ];
        let output = render_pages(&paginate(&elements, 648.0), 468.0);

        assert!(output.starts_with("=== Page 1 of 2 ===\n\nFirst\n"));
        assert!(output.contains("=== Page 2 of 2 ===\n\nSecond"));
        assert!(output.find("First").unwrap() < output.find("Second").unwrap());
    }

    #[test]
    fn test_heading_and_signature() {
        let elements = vec![
            ContentElement::heading("Agreement"),
            ContentElement::signature_block("Signature: Jane Doe"),
        ];
        let output = render_pages(&paginate(&elements, 648.0), 468.0);

        assert!(output.contains("AGREEMENT\n"));
        assert!(output.contains(&format!("Signature: Jane Doe\n{}", SIGNATURE_RULE)));
    }

    #[test]
    fn test_wraps_to_width() {
        let elements = vec![ContentElement::paragraph("alpha beta gamma delta")];
        let output = render_pages(&paginate(&elements, 648.0), 60.0);
        let body: Vec<&str> = output.lines().skip(2).collect();
        assert!(body.len() > 1);
        assert_eq!(body.join(" "), "alpha beta gamma delta");
    }
}
