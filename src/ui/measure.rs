use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Cuts `text` to at most `width` columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = char_width(ch);
        if used + ch_width > width - 1 {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

pub fn pad_to_width(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(pad))
}

/// Hard-wraps prompt text at `width` columns, honoring explicit newlines.
pub fn wrap_prompt(input: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = vec![String::new()];
    let mut used = 0;

    for ch in input.chars() {
        if ch == '\n' {
            lines.push(String::new());
            used = 0;
            continue;
        }
        let ch_width = char_width(ch);
        if used + ch_width > width && used > 0 {
            lines.push(String::new());
            used = 0;
        }
        if let Some(line) = lines.last_mut() {
            line.push(ch);
        }
        used += ch_width;
    }
    lines
}

/// Row and column of the byte offset `cursor` within [`wrap_prompt`] output.
pub fn prompt_cursor(input: &str, cursor: usize, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let (mut row, mut col) = (0, 0);

    for (offset, ch) in input.char_indices() {
        if offset >= cursor {
            break;
        }
        if ch == '\n' {
            row += 1;
            col = 0;
            continue;
        }
        let ch_width = char_width(ch);
        if col + ch_width > width && col > 0 {
            row += 1;
            col = 0;
        }
        col += ch_width;
    }

    if col >= width {
        (row + 1, 0)
    } else {
        (row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate_to_width("Radiology", 20), "Radiology");
        assert_eq!(truncate_to_width("Radiology", 5), "Radi…");
        assert_eq!(truncate_to_width("病院の案内", 5), "病院…");
    }

    #[test]
    fn test_pad_uses_display_columns() {
        assert_eq!(pad_to_width("病", 4), "病  ");
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }

    #[test]
    fn test_wrap_prompt_and_cursor_agree() {
        let input = "abcdef\ngh";
        assert_eq!(wrap_prompt(input, 4), vec!["abcd", "ef", "gh"]);
        assert_eq!(prompt_cursor(input, 5, 4), (1, 1));
        assert_eq!(prompt_cursor(input, input.len(), 4), (2, 2));
        assert_eq!(prompt_cursor("abcd", 4, 4), (1, 0));
    }
}
