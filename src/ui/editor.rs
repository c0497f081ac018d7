use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of feeding one key to the prompt editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Changed,
    Submit(String),
}

/// Single prompt buffer with cursor and recall of earlier prompts.
///
/// The cursor is a byte offset that always sits on a char boundary.
#[derive(Debug, Default)]
pub struct PromptEditor {
    buffer: String,
    cursor: usize,
    recall: Vec<String>,
    recall_index: Option<usize>,
}

impl PromptEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.recall_index = None;
    }

    fn prev_char_boundary(&self, idx: usize) -> usize {
        self.buffer[..idx]
            .char_indices()
            .next_back()
            .map_or(0, |(start, _)| start)
    }

    fn next_char_boundary(&self, idx: usize) -> usize {
        self.buffer[idx..]
            .chars()
            .next()
            .map_or(self.buffer.len(), |ch| idx + ch.len_utf8())
    }

    pub fn insert_str(&mut self, value: &str) {
        let value = value.replace('\r', "");
        self.buffer.insert_str(self.cursor, &value);
        self.cursor += value.len();
        self.recall_index = None;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.prev_char_boundary(self.cursor);
        self.buffer.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.buffer.len() {
            return;
        }
        let end = self.next_char_boundary(self.cursor);
        self.buffer.replace_range(self.cursor..end, "");
    }

    /// Takes the trimmed buffer; `None` leaves an all-whitespace buffer alone.
    pub fn submit(&mut self) -> Option<String> {
        let value = self.buffer.trim().to_string();
        if value.is_empty() {
            return None;
        }
        if self.recall.last() != Some(&value) {
            self.recall.push(value.clone());
        }
        self.clear();
        Some(value)
    }

    fn recall_previous(&mut self) {
        if self.recall.is_empty() {
            return;
        }
        let index = match self.recall_index {
            Some(index) => index.saturating_sub(1),
            None => self.recall.len() - 1,
        };
        self.show_recalled(index);
    }

    fn recall_next(&mut self) {
        let Some(index) = self.recall_index else {
            return;
        };
        if index + 1 >= self.recall.len() {
            self.clear();
        } else {
            self.show_recalled(index + 1);
        }
    }

    fn show_recalled(&mut self, index: usize) {
        self.buffer = self.recall[index].clone();
        self.cursor = self.buffer.len();
        self.recall_index = Some(index);
    }

    pub fn apply_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.insert_str("\n");
            }
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_str("\n");
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Enter => {
                return match self.submit() {
                    Some(value) => EditorAction::Submit(value),
                    None => EditorAction::None,
                };
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.prev_char_boundary(self.cursor),
            KeyCode::Right => self.cursor = self.next_char_boundary(self.cursor),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.buffer.len(),
            KeyCode::Up => self.recall_previous(),
            KeyCode::Down => self.recall_next(),
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.insert_str(ch.encode_utf8(&mut [0; 4]));
            }
            _ => return EditorAction::None,
        }
        EditorAction::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(editor: &mut PromptEditor, text: &str) {
        for ch in text.chars() {
            editor.apply_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_editing_respects_multibyte_boundaries() {
        let mut editor = PromptEditor::new();
        type_text(&mut editor, "Añb");
        editor.apply_key(key(KeyCode::Left));
        editor.apply_key(key(KeyCode::Backspace));
        assert_eq!(editor.buffer(), "Ab");
        assert_eq!(editor.cursor(), 1);

        editor.apply_key(key(KeyCode::Delete));
        assert_eq!(editor.buffer(), "A");
    }

    #[test]
    fn test_enter_submits_trimmed_prompt() {
        let mut editor = PromptEditor::new();
        type_text(&mut editor, "  ICU beds?  ");
        assert_eq!(
            editor.apply_key(key(KeyCode::Enter)),
            EditorAction::Submit("ICU beds?".to_string())
        );
        assert!(editor.is_empty());
        assert_eq!(editor.apply_key(key(KeyCode::Enter)), EditorAction::None);
    }

    #[test]
    fn test_up_and_down_recall_prompts() {
        let mut editor = PromptEditor::new();
        type_text(&mut editor, "first");
        editor.apply_key(key(KeyCode::Enter));
        type_text(&mut editor, "second");
        editor.apply_key(key(KeyCode::Enter));

        editor.apply_key(key(KeyCode::Up));
        assert_eq!(editor.buffer(), "second");
        editor.apply_key(key(KeyCode::Up));
        assert_eq!(editor.buffer(), "first");
        editor.apply_key(key(KeyCode::Down));
        assert_eq!(editor.buffer(), "second");
        editor.apply_key(key(KeyCode::Down));
        assert!(editor.is_empty());
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut editor = PromptEditor::new();
        type_text(&mut editor, "a");
        editor.apply_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut editor, "b");
        assert_eq!(editor.buffer(), "a\nb");
    }
}
