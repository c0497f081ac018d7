use crate::types::Message;

/// Ordered conversation history sent with every run.
///
/// Append-only, except for dropping the newest entry when a turn fails and
/// replacing a committed final response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its position.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn pop_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    /// Overwrites the message at `index`; false when out of range.
    pub fn replace(&mut self, index: usize, message: Message) -> bool {
        match self.messages.get_mut(index) {
            Some(slot) => {
                *slot = message;
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentBlock;

    #[test]
    fn test_push_returns_position_and_pop_removes_newest() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.push(Message::user("first")), 0);
        assert_eq!(transcript.push(Message::user("second")), 1);
        assert_eq!(transcript.pop_last(), Some(Message::user("second")));
        assert_eq!(transcript.messages(), &[Message::user("first")]);
        transcript.pop_last();
        assert_eq!(transcript.pop_last(), None);
    }

    #[test]
    fn test_replace_only_touches_existing_slots() {
        let mut transcript = Transcript::from(vec![Message::user("q")]);
        let answer = Message::assistant(vec![ContentBlock::Text {
            text: "a".to_string(),
        }]);
        assert!(!transcript.replace(1, answer.clone()));
        assert!(transcript.replace(0, answer.clone()));
        assert_eq!(transcript.last(), Some(&answer));
        assert_eq!(transcript.len(), 1);
    }
}
