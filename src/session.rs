#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    // Send token while this entry is an unresolved thinking placeholder.
    pending: Option<u64>,
}

impl Message {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Append-only chat transcript.
///
/// Each send appends the user's message plus a placeholder tagged with a
/// fresh token. Replies resolve the placeholder that carries their token,
/// never "the last entry", so overlapping sends whose replies arrive out of
/// order each land in their own slot and transcript order stays send order.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    next_token: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Starts a send: appends the trimmed user message and a tagged
    /// placeholder, and returns the send token. Blank input is a no-op.
    pub fn begin_send(&mut self, input: &str) -> Option<u64> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        let token = self.next_token;
        self.next_token += 1;

        self.messages.push(Message {
            sender: Sender::User,
            text: text.to_string(),
            pending: None,
        });
        self.messages.push(Message {
            sender: Sender::Agent,
            text: String::new(),
            pending: Some(token),
        });

        Some(token)
    }

    /// Resolves the placeholder tagged with `token`, replacing it in place
    /// with the final agent text. Returns false if no such placeholder
    /// exists (already resolved, or never started).
    pub fn resolve(&mut self, token: u64, text: String) -> bool {
        for message in self.messages.iter_mut() {
            if message.pending == Some(token) {
                message.text = text;
                message.pending = None;
                return true;
            }
        }
        false
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    pub fn is_waiting(&self) -> bool {
        self.pending_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_a_no_op() {
        let mut session = ChatSession::new();
        assert_eq!(session.begin_send(""), None);
        assert_eq!(session.begin_send("   \t "), None);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn send_appends_user_message_and_placeholder() {
        let mut session = ChatSession::new();
        let token = session.begin_send("  hello  ").expect("send should start");

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[1].sender, Sender::Agent);
        assert!(messages[1].is_pending());
        assert_eq!(session.pending_count(), 1);

        assert!(session.resolve(token, "hi".to_string()));
        assert_eq!(session.pending_count(), 0);
        assert_eq!(session.messages()[1].text, "hi");
    }

    #[test]
    fn resolve_is_one_shot() {
        let mut session = ChatSession::new();
        let token = session.begin_send("hello").unwrap();

        assert!(session.resolve(token, "hi".to_string()));
        assert!(!session.resolve(token, "hi again".to_string()));
        assert_eq!(session.messages()[1].text, "hi");
    }

    #[test]
    fn out_of_order_replies_land_in_their_own_slots() {
        let mut session = ChatSession::new();
        let first = session.begin_send("first").unwrap();
        let second = session.begin_send("second").unwrap();
        assert_eq!(session.pending_count(), 2);

        // Second reply arrives before the first.
        assert!(session.resolve(second, "reply to second".to_string()));
        assert!(session.resolve(first, "reply to first".to_string()));

        let messages = session.messages();
        assert_eq!(messages[0].text, "first");
        assert_eq!(messages[1].text, "reply to first");
        assert_eq!(messages[2].text, "second");
        assert_eq!(messages[3].text, "reply to second");
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn resolve_with_unknown_token_changes_nothing() {
        let mut session = ChatSession::new();
        session.begin_send("hello").unwrap();

        assert!(!session.resolve(99, "stale".to_string()));
        assert_eq!(session.pending_count(), 1);
    }
}
