use tokio::task::JoinHandle;

use crate::client::{AgentClient, ChatResult, UploadResult};
use crate::session::ChatSession;

pub const CHAT_CONNECTION_ERROR: &str = "Connection error contacting the agent.";
pub const UPLOAD_CONNECTION_ERROR: &str = "Connection error during upload.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Style marker for the upload status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

/// An in-flight chat round trip. The token identifies which transcript
/// placeholder the reply belongs to.
pub struct PendingSend {
    pub token: u64,
    pub handle: JoinHandle<anyhow::Result<ChatResult>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Chat widget
    pub session: ChatSession,
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // inner chat area size, updated during render
    pub chat_width: u16,
    pub pending_sends: Vec<PendingSend>,

    // Upload widget
    pub show_upload: bool,
    pub upload_input: String,
    pub upload_cursor: usize,
    pub status: Option<StatusLine>,
    pub pending_upload: Option<JoinHandle<anyhow::Result<UploadResult>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: AgentClient,
}

impl App {
    pub fn new(client: AgentClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            session: ChatSession::new(),
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            pending_sends: Vec::new(),

            show_upload: false,
            upload_input: String::new(),
            upload_cursor: 0,
            status: None,
            pending_upload: None,

            animation_frame: 0,

            client,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: String) {
        self.status = Some(StatusLine { kind, text });
    }

    /// Folds a finished chat round trip back into the transcript. The
    /// placeholder is replaced on every path: agent reply, agent error, or
    /// transport failure.
    pub fn finish_send(&mut self, token: u64, result: anyhow::Result<ChatResult>) {
        let text = match result {
            Ok(reply) if reply.success => reply.response.unwrap_or_default(),
            Ok(reply) => format!(
                "Agent error: {}",
                reply.error.unwrap_or_else(|| "unknown error".to_string())
            ),
            Err(_) => CHAT_CONNECTION_ERROR.to_string(),
        };
        self.session.resolve(token, text);
        self.scroll_to_bottom();
    }

    /// Folds a finished upload into the status line. On success the chat
    /// input is pre-filled with a suggested command naming the uploaded
    /// file; it is never submitted automatically.
    pub fn finish_upload(&mut self, result: anyhow::Result<UploadResult>) {
        match result {
            Ok(outcome) if outcome.success => {
                let filename = outcome.filename.unwrap_or_default();
                self.set_status(
                    StatusKind::Success,
                    format!("File '{}' uploaded and ready to use.", filename),
                );
                self.input = suggested_command(&filename);
                self.cursor = self.input.chars().count();
            }
            Ok(outcome) => {
                self.set_status(
                    StatusKind::Error,
                    format!(
                        "Upload error: {}",
                        outcome.error.unwrap_or_else(|| "unknown error".to_string())
                    ),
                );
            }
            Err(_) => {
                self.set_status(StatusKind::Error, UPLOAD_CONNECTION_ERROR.to_string());
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(self.max_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height / 2);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.chat_scroll = (self.chat_scroll + self.chat_height / 2).min(self.max_scroll());
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll the transcript so the newest entry (or the thinking
    /// placeholder) is visible.
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.transcript_lines().saturating_sub(visible)
    }

    /// Wrapped line count of the rendered transcript, mirroring the layout
    /// in `ui::transcript_text`.
    fn transcript_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;
        for message in self.session.messages() {
            total += 1; // Role line ("You:" or "Agent:")
            if message.is_pending() {
                total += 1; // "Thinking..."
            } else if message.text.is_empty() {
                total += 1;
            } else {
                for line in message.text.lines() {
                    // Character count, not byte length, for UTF-8 safety
                    let chars = line.chars().count();
                    if chars == 0 {
                        total += 1;
                    } else {
                        total += ((chars / wrap_width) + 1) as u16;
                    }
                }
            }
            total += 1; // Blank line after message
        }
        total
    }
}

/// The command the upload widget drops into the chat input after a
/// successful upload.
pub fn suggested_command(filename: &str) -> String {
    format!("Send an email with the attachment {}", filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatResult, UploadResult};
    use anyhow::anyhow;

    fn test_app() -> App {
        App::new(AgentClient::new("http://localhost:8001"))
    }

    #[test]
    fn successful_reply_replaces_placeholder() {
        let mut app = test_app();
        let token = app.session.begin_send("hello").unwrap();

        app.finish_send(
            token,
            Ok(ChatResult {
                success: true,
                response: Some("hi".to_string()),
                error: None,
            }),
        );

        let messages = app.session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[1].text, "hi");
        assert_eq!(app.session.pending_count(), 0);
    }

    #[test]
    fn agent_error_is_shown_verbatim() {
        let mut app = test_app();
        let token = app.session.begin_send("hello").unwrap();

        app.finish_send(
            token,
            Ok(ChatResult {
                success: false,
                response: None,
                error: Some("quota exceeded".to_string()),
            }),
        );

        assert_eq!(
            app.session.messages()[1].text,
            "Agent error: quota exceeded"
        );
        assert_eq!(app.session.pending_count(), 0);
    }

    #[test]
    fn transport_failure_still_clears_placeholder() {
        let mut app = test_app();
        let token = app.session.begin_send("hello").unwrap();

        app.finish_send(token, Err(anyhow!("connection refused")));

        assert_eq!(app.session.pending_count(), 0);
        assert_eq!(app.session.messages()[1].text, CHAT_CONNECTION_ERROR);
    }

    #[test]
    fn upload_success_sets_status_and_prefills_input() {
        let mut app = test_app();

        app.finish_upload(Ok(UploadResult {
            success: true,
            filename: Some("report.pdf".to_string()),
            error: None,
        }));

        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert!(status.text.contains("report.pdf"));
        assert_eq!(app.input, "Send an email with the attachment report.pdf");
        assert_eq!(app.cursor, app.input.chars().count());
    }

    #[test]
    fn upload_error_is_shown_verbatim() {
        let mut app = test_app();

        app.finish_upload(Ok(UploadResult {
            success: false,
            filename: None,
            error: Some("too large".to_string()),
        }));

        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Upload error: too large");
        assert!(app.input.is_empty());
    }

    #[test]
    fn upload_transport_failure_shows_generic_message() {
        let mut app = test_app();

        app.finish_upload(Err(anyhow!("connection refused")));

        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, UPLOAD_CONNECTION_ERROR);
    }
}
