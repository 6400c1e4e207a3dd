use crate::metrics::Font;

/// Greedy word wrap of `text` to `max_width` points.
///
/// Hard line breaks are kept; runs of spaces between words collapse to one.
/// A word wider than the line on its own is broken at character boundaries.
/// Empty text yields no lines, while an empty hard line yields an empty line.
pub fn wrap_text(text: &str, font: Font, font_size: f32, max_width: f32) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let space = font.text_width(" ", font_size);
    let mut lines = Vec::new();

    for hard_line in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in hard_line.split_whitespace() {
            let word_width = font.text_width(word, font_size);

            if current.is_empty() {
                if word_width <= max_width {
                    current.push_str(word);
                    current_width = word_width;
                } else {
                    current_width = break_word(word, font, font_size, max_width, &mut lines, &mut current);
                }
                continue;
            }

            if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                if word_width <= max_width {
                    current.push_str(word);
                    current_width = word_width;
                } else {
                    current_width = break_word(word, font, font_size, max_width, &mut lines, &mut current);
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// Split an over-long word into line-sized chunks.
///
/// Full chunks go to `lines`; the remainder is left in `current` and its width
/// returned so the caller can keep filling the line.
fn break_word(
    word: &str,
    font: Font,
    font_size: f32,
    max_width: f32,
    lines: &mut Vec<String>,
    current: &mut String,
) -> f32 {
    let mut width = 0.0;
    for c in word.chars() {
        let advance = f32::from(font.advance(c)) * font_size / 1000.0;
        // Every line holds at least one character, however narrow the column.
        if width + advance > max_width && !current.is_empty() {
            lines.push(std::mem::take(current));
            width = 0.0;
        }
        current.push(c);
        width += advance;
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, width: f32) -> Vec<String> {
        // Digits are all 556 units, so at 10pt each is 5.56pt wide.
        wrap_text(text, Font::Helvetica, 10.0, width)
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(wrap("", 100.0).is_empty());
    }

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(wrap("Name: ____", 468.0), vec!["Name: ____"]);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        // "1111" is 22.24pt, a space 2.78pt; two words need 47.26pt.
        assert_eq!(wrap("1111 2222 3333", 48.0), vec!["1111 2222", "3333"]);
        assert_eq!(wrap("1111 2222 3333", 30.0), vec!["1111", "2222", "3333"]);
    }

    #[test]
    fn test_hard_breaks_kept() {
        assert_eq!(wrap("a\n\nb", 100.0), vec!["a", "", "b"]);
    }

    #[test]
    fn test_long_word_is_broken() {
        // Four digits fit in 23pt, five do not.
        let lines = wrap("1234567890", 23.0);
        assert_eq!(lines, vec!["1234", "5678", "90"]);
    }

    #[test]
    fn test_long_word_after_text() {
        let lines = wrap("1 123456", 23.0);
        assert_eq!(lines, vec!["1", "1234", "56"]);
    }

    #[test]
    fn test_tiny_width_still_progresses() {
        let lines = wrap("abc", 1.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_collapses_inner_spaces() {
        assert_eq!(wrap("a    b", 100.0), vec!["a b"]);
    }
}
