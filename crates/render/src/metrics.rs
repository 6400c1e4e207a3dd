//! Advance widths of the base-14 Helvetica faces.
//!
//! Widths are in 1/1000 em for the printable ASCII range, taken from the
//! Adobe font metrics with WinAnsi encoding. Characters outside that range
//! fall back to the width of a digit, which is close to the face average.

/// Fonts the renderer draws with; both are built into every PDF reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

/// Width used for characters without an entry in the tables.
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

impl Font {
    pub fn for_weight(bold: bool) -> Self {
        if bold {
            Font::HelveticaBold
        } else {
            Font::Helvetica
        }
    }

    /// PostScript name used in the PDF font dictionary.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource key the page content streams refer to.
    pub fn resource_key(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// Advance width of `c` in 1/1000 em.
    pub fn advance(&self, c: char) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA,
            Font::HelveticaBold => &HELVETICA_BOLD,
        };
        match c {
            ' '..='~' => table[c as usize - 0x20],
            '\t' => table[0] * 4,
            _ => FALLBACK_WIDTH,
        }
    }

    /// Width of `text` set at `font_size` points.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.advance(c))).sum();
        units as f32 * font_size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_advances() {
        assert_eq!(Font::Helvetica.advance(' '), 278);
        assert_eq!(Font::Helvetica.advance('0'), 556);
        assert_eq!(Font::Helvetica.advance('@'), 1015);
        assert_eq!(Font::Helvetica.advance('W'), 944);
        assert_eq!(Font::Helvetica.advance('i'), 222);
        assert_eq!(Font::Helvetica.advance('~'), 584);
        assert_eq!(Font::HelveticaBold.advance('i'), 278);
        assert_eq!(Font::HelveticaBold.advance('@'), 975);
    }

    #[test]
    fn test_fallback_width() {
        assert_eq!(Font::Helvetica.advance('é'), FALLBACK_WIDTH);
        assert_eq!(Font::HelveticaBold.advance('€'), FALLBACK_WIDTH);
    }

    #[test]
    fn test_text_width() {
        // "Hi" = 722 + 222 units
        let width = Font::Helvetica.text_width("Hi", 10.0);
        assert!((width - 9.44).abs() < 1e-4);
        assert_eq!(Font::Helvetica.text_width("", 12.0), 0.0);
    }

    #[test]
    fn test_bold_is_wider() {
        let text = "Signature of the authorized representative";
        assert!(Font::HelveticaBold.text_width(text, 11.0) > Font::Helvetica.text_width(text, 11.0));
    }

    #[test]
    fn test_names() {
        assert_eq!(Font::for_weight(true).base_name(), "Helvetica-Bold");
        assert_eq!(Font::for_weight(false).resource_key(), "F1");
    }
}
