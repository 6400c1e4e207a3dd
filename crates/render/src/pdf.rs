//! PDF output through lopdf.
//!
//! Each placed element is drawn at the offset the paginator gave it, using
//! the same wrapped lines the measurer counted. Only the two built-in
//! Helvetica faces are used, so no font data is embedded.

use formpage_core::{ElementKind, Page, PageGeometry, PlacedElement};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::measure::TextMeasurer;
use crate::metrics::Font;
use crate::RenderError;

/// Longest signature rule, in points.
const SIGNATURE_RULE_WIDTH: f32 = 216.0;
const SIGNATURE_RULE_THICKNESS: f32 = 0.75;

/// Render pages into a complete PDF file.
///
/// An empty page list still produces a document with one blank page.
pub fn render_pdf(pages: &[Page], geometry: &PageGeometry) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in [Font::Helvetica, Font::HelveticaBold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_key(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let measurer = TextMeasurer::new();
    let mut kids: Vec<Object> = Vec::new();
    if pages.is_empty() {
        kids.push(add_page(&mut doc, pages_id, geometry, Vec::new())?.into());
    }
    for page in pages {
        let mut operations = Vec::new();
        for placed in &page.elements {
            draw_element(&mut operations, &measurer, placed, geometry);
        }
        log::debug!(
            "page {}: {} elements, {} drawing operations",
            page.number,
            page.elements.len(),
            operations.len()
        );
        kids.push(add_page(&mut doc, pages_id, geometry, operations)?.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "Resources" => resources_id,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    geometry: &PageGeometry,
    operations: Vec<Operation>,
) -> Result<ObjectId, RenderError> {
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.width),
            Object::Real(geometry.height),
        ],
    }))
}

fn draw_element(
    operations: &mut Vec<Operation>,
    measurer: &TextMeasurer,
    placed: &PlacedElement,
    geometry: &PageGeometry,
) {
    let element = &placed.element;
    let style = &element.style;
    if element.kind == ElementKind::Spacer {
        return;
    }

    let font = Font::for_weight(style.bold);
    let leading = TextMeasurer::leading(style);
    let top = geometry.height - geometry.margin_top - placed.y - style.space_before;
    let baseline = |line: usize| top - line as f32 * leading - style.font_size;

    let lines = measurer.layout_lines(element, style, geometry.content_width());
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(font.resource_key().as_bytes().to_vec()),
                Object::Real(style.font_size),
            ],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(geometry.margin_left), Object::Real(baseline(i))],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(line), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    if element.kind == ElementKind::SignatureBlock {
        let y = baseline(lines.len());
        let x_end = geometry.margin_left + SIGNATURE_RULE_WIDTH.min(geometry.content_width());
        operations.push(Operation::new("w", vec![Object::Real(SIGNATURE_RULE_THICKNESS)]));
        operations.push(Operation::new(
            "m",
            vec![Object::Real(geometry.margin_left), Object::Real(y)],
        ));
        operations.push(Operation::new("l", vec![Object::Real(x_end), Object::Real(y)]));
        operations.push(Operation::new("S", vec![]));
    }
}

/// Encode text for a WinAnsiEncoding font.
///
/// Latin-1 characters map to themselves; the euro sign and typographic quotes
/// use their Windows-1252 slots. Anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
