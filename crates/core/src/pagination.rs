//! Page assignment for measured content
//!
//! A single forward pass over the element list. Each element's height comes
//! from an injected [`Measure`] implementation, so the algorithm knows nothing
//! about fonts or text shaping. Placement honors the element directives:
//!
//! - `break_before` closes the current page unless it is still empty;
//! - `keep_with_next` chains are placed as one unit;
//! - `keep_together` elements are never split.
//!
//! A chain taller than a page gives up its links one at a time from the
//! front, so a heading still travels with the element it introduces. An
//! element taller than a whole page is placed unsplit on a fresh page (with
//! the element keeping with it, if any) and reported as
//! [`PaginationWarning::Oversized`]; the document is never rejected for
//! layout reasons. Only invalid geometry or styles fail.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::element::{ContentElement, TextStyle};
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Measurement seam
// ---------------------------------------------------------------------------

/// Height of an element once rendered at `available_width`.
///
/// Implementations must be pure: the paginator caches the first answer for
/// each element within a call.
pub trait Measure {
    fn measure(&self, element: &ContentElement, style: &TextStyle, available_width: f32) -> f32;
}

impl<F> Measure for F
where
    F: Fn(&ContentElement, &TextStyle, f32) -> f32,
{
    fn measure(&self, element: &ContentElement, style: &TextStyle, available_width: f32) -> f32 {
        self(element, style, available_width)
    }
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// An element positioned on a page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlacedElement {
    /// Position of the element in the input list.
    pub index: usize,
    /// Offset from the top of the content area.
    pub y: f32,
    pub height: f32,
    pub element: ContentElement,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub used_height: f32,
    pub elements: Vec<PlacedElement>,
}

impl Page {
    pub fn indices(&self) -> Vec<usize> {
        self.elements.iter().map(|p| p.index).collect()
    }
}

/// Why a keep-with-next chain could not stay on one page.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChainBreakReason {
    /// The chain as a whole is taller than a page.
    TooTall,
    /// The next element demands a page break.
    ForcedBreak,
}

/// Non-fatal layout findings, surfaced to the caller for optional notice.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationWarning {
    /// An element taller than the content area was placed whole on a fresh
    /// page, together with at most the one element keeping with it.
    Oversized {
        index: usize,
        height: f32,
        content_height: f32,
        page: usize,
    },
    /// Element `first` keeps with `last` (its successor) but they do not share
    /// a page.
    ChainBroken {
        first: usize,
        last: usize,
        reason: ChainBreakReason,
    },
}

impl fmt::Display for PaginationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationWarning::Oversized {
                index,
                height,
                content_height,
                page,
            } => write!(
                f,
                "element {} is {:.1}pt tall but a page holds {:.1}pt; placed unsplit on page {}",
                index, height, content_height, page
            ),
            PaginationWarning::ChainBroken {
                first,
                last,
                reason: ChainBreakReason::TooTall,
            } => write!(
                f,
                "elements {} and {} do not fit on one page; keep-with-next released",
                first, last
            ),
            PaginationWarning::ChainBroken {
                first,
                last,
                reason: ChainBreakReason::ForcedBreak,
            } => write!(
                f,
                "element {} keeps with next but element {} forces a page break",
                first, last
            ),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub warnings: Vec<PaginationWarning>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Input indices in output order; equals `0..n` for every valid run.
    pub fn element_order(&self) -> Vec<usize> {
        self.pages.iter().flat_map(|p| p.indices()).collect()
    }

    /// Page number holding the input element `index`.
    pub fn page_of(&self, index: usize) -> Option<usize> {
        self.pages
            .iter()
            .find(|p| p.elements.iter().any(|e| e.index == index))
            .map(|p| p.number)
    }
}

// ---------------------------------------------------------------------------
// Internal: measurement cache and page accumulator
// ---------------------------------------------------------------------------

/// Heights measured during one call, filled on first use.
struct MeasureCache<'a, M: ?Sized> {
    elements: &'a [ContentElement],
    measurer: &'a M,
    width: f32,
    heights: Vec<Option<f32>>,
}

impl<'a, M: Measure + ?Sized> MeasureCache<'a, M> {
    fn new(elements: &'a [ContentElement], measurer: &'a M, width: f32) -> Self {
        Self {
            elements,
            measurer,
            width,
            heights: vec![None; elements.len()],
        }
    }

    fn height(&mut self, index: usize) -> Result<f32, EngineError> {
        if let Some(height) = self.heights[index] {
            return Ok(height);
        }

        let element = &self.elements[index];
        let height = self.measurer.measure(element, &element.style, self.width);
        if !height.is_finite() || height < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "element {} ({}) measured to an invalid height {}",
                index, element.kind, height
            )));
        }

        self.heights[index] = Some(height);
        Ok(height)
    }
}

struct PageBuilder {
    content_height: f32,
    spacing: f32,
    pages: Vec<Page>,
    current: Vec<PlacedElement>,
    used: f32,
}

impl PageBuilder {
    fn new(config: &LayoutConfig) -> Self {
        Self {
            content_height: config.content_height,
            spacing: config.element_spacing,
            pages: Vec::new(),
            current: Vec::new(),
            used: 0.0,
        }
    }

    /// Offset the next element would be placed at.
    fn next_offset(&self) -> f32 {
        if self.current.is_empty() {
            0.0
        } else {
            self.used + self.spacing
        }
    }

    fn fits(&self, unit_height: f32) -> bool {
        self.next_offset() + unit_height <= self.content_height
    }

    fn next_page_number(&self) -> usize {
        self.pages.len() + 1
    }

    fn place(&mut self, index: usize, element: &ContentElement, height: f32) {
        let y = self.next_offset();
        self.current.push(PlacedElement {
            index,
            y,
            height,
            element: element.clone(),
        });
        self.used = y + height;
    }

    fn close(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let number = self.next_page_number();
        log::debug!(
            "closing page {} with {} elements ({:.1}pt used)",
            number,
            self.current.len(),
            self.used
        );
        self.pages.push(Page {
            number,
            used_height: self.used,
            elements: std::mem::take(&mut self.current),
        });
        self.used = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Paginator
// ---------------------------------------------------------------------------

/// Pagination with a fixed [`LayoutConfig`]. Stateless between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paginator {
    config: LayoutConfig,
}

impl Paginator {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Assign `elements` to pages, preserving their order.
    ///
    /// Fails only on invalid geometry, an invalid element style, or a
    /// measurer returning a negative or non-finite height; no partial
    /// output is produced in those cases.
    pub fn paginate<M: Measure + ?Sized>(
        &self,
        elements: &[ContentElement],
        measurer: &M,
    ) -> Result<Pagination, EngineError> {
        self.config.validate()?;
        for element in elements {
            element.validate()?;
        }

        let mut cache = MeasureCache::new(elements, measurer, self.config.content_width);
        let mut builder = PageBuilder::new(&self.config);
        let mut warnings = Vec::new();

        let mut start = 0;
        while start < elements.len() {
            if elements[start].directives.break_before {
                if start > 0 && elements[start - 1].directives.keep_with_next {
                    warnings.push(PaginationWarning::ChainBroken {
                        first: start - 1,
                        last: start,
                        reason: ChainBreakReason::ForcedBreak,
                    });
                }
                builder.close();
            }

            let end = chain_end(elements, start);
            let unit_height = self.unit_height(&mut cache, start, end)?;

            if end == start || unit_height <= self.config.content_height {
                self.place_unit(&mut builder, &mut cache, start, end, &mut warnings)?;
                start = end + 1;
                continue;
            }

            // The chain cannot share one page. Give up as few links as possible,
            // starting from the front, and re-pack the rest.
            let content_height = self.config.content_height;
            let next_oversized = cache.height(start + 1)? > content_height;
            if next_oversized && cache.height(start)? <= content_height {
                // The lead element rides along with the oversized one.
                self.place_unit(&mut builder, &mut cache, start, start + 1, &mut warnings)?;
                if end > start + 1 {
                    warnings.push(PaginationWarning::ChainBroken {
                        first: start + 1,
                        last: start + 2,
                        reason: ChainBreakReason::TooTall,
                    });
                }
                start += 2;
            } else {
                warnings.push(PaginationWarning::ChainBroken {
                    first: start,
                    last: start + 1,
                    reason: ChainBreakReason::TooTall,
                });
                self.place_unit(&mut builder, &mut cache, start, start, &mut warnings)?;
                start += 1;
            }
        }
        builder.close();

        // A released link whose ends still landed on the same page lost nothing.
        let page_numbers = page_numbers(&builder.pages, elements.len());
        warnings.retain(|warning| match warning {
            PaginationWarning::ChainBroken {
                first,
                last,
                reason: ChainBreakReason::TooTall,
            } => page_numbers[*first] != page_numbers[*last],
            _ => true,
        });

        for warning in &warnings {
            log::warn!("{}", warning);
        }

        Ok(Pagination {
            pages: builder.pages,
            warnings,
        })
    }

    /// Combined height of `first..=last` including the gaps between them.
    fn unit_height<M: Measure + ?Sized>(
        &self,
        cache: &mut MeasureCache<'_, M>,
        first: usize,
        last: usize,
    ) -> Result<f32, EngineError> {
        let mut total = 0.0;
        for index in first..=last {
            total += cache.height(index)?;
        }
        Ok(total + self.config.element_spacing * (last - first) as f32)
    }

    /// Place `first..=last` on one page, opening a fresh page when needed.
    fn place_unit<M: Measure + ?Sized>(
        &self,
        builder: &mut PageBuilder,
        cache: &mut MeasureCache<'_, M>,
        first: usize,
        last: usize,
        warnings: &mut Vec<PaginationWarning>,
    ) -> Result<(), EngineError> {
        let unit_height = self.unit_height(cache, first, last)?;
        if !builder.fits(unit_height) {
            builder.close();
        }

        for index in first..=last {
            let height = cache.height(index)?;
            if height > self.config.content_height {
                warnings.push(PaginationWarning::Oversized {
                    index,
                    height,
                    content_height: self.config.content_height,
                    page: builder.next_page_number(),
                });
            }
            builder.place(index, &cache.elements[index], height);
        }
        Ok(())
    }
}

/// Last index of the keep-with-next chain starting at `start`.
///
/// A forced break inside a chain ends it early.
fn chain_end(elements: &[ContentElement], start: usize) -> usize {
    let mut end = start;
    while elements[end].directives.keep_with_next
        && end + 1 < elements.len()
        && !elements[end + 1].directives.break_before
    {
        end += 1;
    }
    end
}

/// Page number of every element, by input index.
fn page_numbers(pages: &[Page], len: usize) -> Vec<usize> {
    let mut numbers = vec![0; len];
    for page in pages {
        for placed in &page.elements {
            numbers[placed.index] = page.number;
        }
    }
    numbers
}

/// Paginate against a bare content height with default width and spacing.
pub fn paginate<M: Measure + ?Sized>(
    elements: &[ContentElement],
    content_height: f32,
    measurer: &M,
) -> Result<Pagination, EngineError> {
    Paginator::new(LayoutConfig::with_content_height(content_height)).paginate(elements, measurer)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Test measurer: the element text is its height.
    fn by_text(element: &ContentElement, _style: &TextStyle, _width: f32) -> f32 {
        element.text.parse().unwrap_or(0.0)
    }

    fn paragraphs(heights: &[u32]) -> Vec<ContentElement> {
        heights
            .iter()
            .map(|h| ContentElement::paragraph(h.to_string()))
            .collect()
    }

    fn page_indices(result: &Pagination) -> Vec<Vec<usize>> {
        result.pages.iter().map(|p| p.indices()).collect()
    }

    #[test]
    fn test_three_paragraphs() {
        let result = paginate(&paragraphs(&[200, 200, 200]), 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0, 1], vec![2]]);
        assert!(result.warnings.is_empty());
        assert_eq!(result.pages[0].used_height, 400.0);
        assert_eq!(result.pages[0].elements[1].y, 200.0);
        assert_eq!(result.pages[1].number, 2);
    }

    #[test]
    fn test_oversized_signature_block() {
        let elements = vec![ContentElement::signature_block("600")];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0]]);
        assert_eq!(
            result.warnings,
            vec![PaginationWarning::Oversized {
                index: 0,
                height: 600.0,
                content_height: 500.0,
                page: 1,
            }]
        );
    }

    #[test]
    fn test_oversized_element_stands_alone() {
        let elements = paragraphs(&[100, 600, 50]);
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0], vec![1], vec![2]]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_content_height_is_invalid() {
        let result = paginate(&paragraphs(&[10]), 0.0, &by_text);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_measurement_is_invalid() {
        let negative = |_: &ContentElement, _: &TextStyle, _: f32| -1.0f32;
        let result = paginate(&paragraphs(&[10]), 500.0, &negative);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_style_is_invalid() {
        let elements = vec![ContentElement::paragraph("10").with_style(TextStyle {
            font_size: -2.0,
            ..TextStyle::default()
        })];
        assert!(paginate(&elements, 500.0, &by_text).is_err());
    }

    #[test]
    fn test_empty_input() {
        let result = paginate(&[], 500.0, &by_text).unwrap();
        assert!(result.pages.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_exact_fit() {
        let result = paginate(&paragraphs(&[250, 250, 1]), 500.0, &by_text).unwrap();
        assert_eq!(page_indices(&result), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_heading_moves_with_next() {
        let elements = vec![
            ContentElement::paragraph("400"),
            ContentElement::heading("50"),
            ContentElement::paragraph("100"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        // Heading alone would fit on page 1, but not with its paragraph.
        assert_eq!(page_indices(&result), vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_transitive_chain() {
        let elements = vec![
            ContentElement::paragraph("300"),
            ContentElement::paragraph("50").keep_with_next(true),
            ContentElement::paragraph("50").keep_with_next(true),
            ContentElement::paragraph("150"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();
        assert_eq!(page_indices(&result), vec![vec![0], vec![1, 2, 3]]);
    }

    #[test]
    fn test_keep_with_next_on_last_element() {
        let elements = vec![
            ContentElement::paragraph("100"),
            ContentElement::heading("100"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();
        assert_eq!(page_indices(&result), vec![vec![0, 1]]);
    }

    #[test]
    fn test_too_tall_chain_is_released() {
        let elements = vec![
            ContentElement::paragraph("300").keep_with_next(true),
            ContentElement::paragraph("300").keep_with_next(true),
            ContentElement::paragraph("100"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0], vec![1, 2]]);
        assert_eq!(
            result.warnings,
            vec![PaginationWarning::ChainBroken {
                first: 0,
                last: 1,
                reason: ChainBreakReason::TooTall,
            }]
        );
    }

    #[test]
    fn test_released_chain_keeps_heading_with_paragraph() {
        let elements = vec![
            ContentElement::paragraph("400").keep_with_next(true),
            ContentElement::heading("50"),
            ContentElement::paragraph("100"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0], vec![1, 2]]);
        assert_eq!(
            result.warnings,
            vec![PaginationWarning::ChainBroken {
                first: 0,
                last: 1,
                reason: ChainBreakReason::TooTall,
            }]
        );
    }

    #[test]
    fn test_heading_stays_with_oversized_block() {
        let elements = vec![
            ContentElement::paragraph("100"),
            ContentElement::heading("50"),
            ContentElement::signature_block("600"),
            ContentElement::paragraph("20"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0], vec![1, 2], vec![3]]);
        assert_eq!(
            result.warnings,
            vec![PaginationWarning::Oversized {
                index: 2,
                height: 600.0,
                content_height: 500.0,
                page: 2,
            }]
        );
    }

    #[test]
    fn test_long_chain_gives_up_one_link_at_a_time() {
        let elements = vec![
            ContentElement::paragraph("200").keep_with_next(true),
            ContentElement::paragraph("200").keep_with_next(true),
            ContentElement::paragraph("200").keep_with_next(true),
            ContentElement::paragraph("200"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        // The first link is released but both ends still fit on page 1.
        assert_eq!(page_indices(&result), vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(
            result.warnings,
            vec![PaginationWarning::ChainBroken {
                first: 1,
                last: 2,
                reason: ChainBreakReason::TooTall,
            }]
        );
    }

    #[test]
    fn test_oversized_lead_is_released() {
        let elements = vec![
            ContentElement::paragraph("600").keep_with_next(true),
            ContentElement::paragraph("100"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0], vec![1]]);
        assert!(matches!(
            result.warnings[0],
            PaginationWarning::ChainBroken {
                first: 0,
                last: 1,
                reason: ChainBreakReason::TooTall
            }
        ));
        assert!(matches!(
            result.warnings[1],
            PaginationWarning::Oversized { index: 0, .. }
        ));
    }

    #[test]
    fn test_break_before() {
        let elements = vec![
            ContentElement::paragraph("10"),
            ContentElement::heading("10").break_before(true),
            ContentElement::paragraph("10"),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();
        assert_eq!(page_indices(&result), vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_break_before_on_first_element_adds_no_page() {
        let elements = vec![ContentElement::paragraph("10").break_before(true)];
        let result = paginate(&elements, 500.0, &by_text).unwrap();
        assert_eq!(result.page_count(), 1);
    }

    #[test]
    fn test_forced_break_ends_chain() {
        let elements = vec![
            ContentElement::heading("10"),
            ContentElement::paragraph("10").break_before(true),
        ];
        let result = paginate(&elements, 500.0, &by_text).unwrap();

        assert_eq!(page_indices(&result), vec![vec![0], vec![1]]);
        assert!(matches!(
            result.warnings[0],
            PaginationWarning::ChainBroken {
                first: 0,
                last: 1,
                reason: ChainBreakReason::ForcedBreak
            }
        ));
    }

    #[test]
    fn test_element_spacing() {
        let config = LayoutConfig {
            content_height: 500.0,
            content_width: 400.0,
            element_spacing: 20.0,
        };
        let result = Paginator::new(config)
            .paginate(&paragraphs(&[200, 200, 200]), &by_text)
            .unwrap();

        assert_eq!(page_indices(&result), vec![vec![0, 1], vec![2]]);
        assert_eq!(result.pages[0].elements[1].y, 220.0);
        assert_eq!(result.pages[0].used_height, 420.0);
        // No gap at the top of a page.
        assert_eq!(result.pages[1].elements[0].y, 0.0);

        let tight = Paginator::new(config)
            .paginate(&paragraphs(&[240, 250]), &by_text)
            .unwrap();
        assert_eq!(tight.page_count(), 2);
    }

    #[test]
    fn test_each_element_measured_once() {
        let calls = Cell::new(0);
        let counting = |element: &ContentElement, style: &TextStyle, width: f32| {
            calls.set(calls.get() + 1);
            by_text(element, style, width)
        };

        let elements = vec![
            ContentElement::paragraph("300").keep_with_next(true),
            ContentElement::paragraph("300").keep_with_next(true),
            ContentElement::paragraph("100"),
            ContentElement::heading("20"),
            ContentElement::paragraph("20"),
        ];
        paginate(&elements, 500.0, &counting).unwrap();
        assert_eq!(calls.get(), elements.len());
    }

    #[test]
    fn test_measurer_receives_width_and_style() {
        let seen = Cell::new((0.0f32, 0.0f32));
        let recording = |_: &ContentElement, style: &TextStyle, width: f32| {
            seen.set((style.font_size, width));
            10.0f32
        };
        let config = LayoutConfig {
            content_height: 100.0,
            content_width: 321.0,
            element_spacing: 0.0,
        };
        Paginator::new(config)
            .paginate(&[ContentElement::heading("x")], &recording)
            .unwrap();
        assert_eq!(seen.get(), (14.0, 321.0));
    }

    #[test]
    fn test_deterministic() {
        let elements = vec![
            ContentElement::heading("40"),
            ContentElement::paragraph("300"),
            ContentElement::field_block("180"),
            ContentElement::signature_block("120").break_before(true),
            ContentElement::paragraph("480"),
        ];
        let a = paginate(&elements, 500.0, &by_text).unwrap();
        let b = paginate(&elements, 500.0, &by_text).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.element_order(), vec![0, 1, 2, 3, 4]);
        assert_eq!(a.page_of(3), Some(3));
    }

    #[test]
    fn test_warning_display() {
        let warning = PaginationWarning::Oversized {
            index: 2,
            height: 600.0,
            content_height: 500.0,
            page: 3,
        };
        assert_eq!(
            warning.to_string(),
            "element 2 is 600.0pt tall but a page holds 500.0pt; placed unsplit on page 3"
        );
    }
}
