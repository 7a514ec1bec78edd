use concierge_core::{
    Completion, ConciergeClient, DialOutcome, EscapeHatch, Launcher, RemoteCallFailed, Session,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Launcher shared with the blocking dial task
pub type BoxedLauncher = Box<dyn Launcher + Send + Sync>;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,

    // Conversation
    pub session: Session,
    pub client: ConciergeClient,
    pub query_task: Option<JoinHandle<Result<String, RemoteCallFailed>>>,

    // Draft editing
    pub cursor: usize,

    // Chat viewport
    pub chat_scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16, // Inner height of the chat area, set during render
    pub chat_width: u16,  // Inner width, for wrap calculations

    // Escape hatch; the system opener blocks, so it runs off the event loop
    pub hatch: Arc<EscapeHatch<BoxedLauncher>>,
    pub dial_task: Option<JoinHandle<DialOutcome>>,
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(
        session: Session,
        client: ConciergeClient,
        hatch: EscapeHatch<BoxedLauncher>,
    ) -> Self {
        let status = if client.is_configured() {
            None
        } else {
            Some(format!(
                "No API key for {}. Set {} or add it to the config file.",
                client.provider().display_name(),
                client.provider().key_env_vars().join(" / ")
            ))
        };

        Self {
            should_quit: false,
            session,
            client,
            query_task: None,
            cursor: 0,
            chat_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_width: 0,
            hatch: Arc::new(hatch),
            dial_task: None,
            status,
            animation_frame: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Send the draft. The input is disabled while a call is in flight, so
    /// a submit then is dropped rather than queued.
    pub fn submit(&mut self) {
        if self.is_busy() {
            return;
        }
        let Some(request) = self.session.submit() else {
            return;
        };

        self.cursor = 0;
        self.follow_bottom = true;
        self.animation_frame = 0;

        let client = self.client.clone();
        self.query_task = Some(tokio::spawn(async move { client.complete(&request).await }));
    }

    /// Resolve the session once the background call has finished
    pub async fn poll_completion(&mut self) {
        if self.query_task.as_ref().is_some_and(|task| task.is_finished()) {
            self.finish_completion().await;
        }
    }

    /// Wait for the in-flight call, however long it takes
    pub async fn finish_completion(&mut self) {
        let Some(task) = self.query_task.take() else {
            return;
        };
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(RemoteCallFailed::aborted(e.to_string())),
        };
        self.session.resolve(outcome);
        self.follow_bottom = true;
    }

    /// Start the escape hatch. A second press while the opener is still
    /// running is ignored.
    pub fn dial(&mut self) {
        if self.dial_task.is_some() {
            return;
        }
        self.status = Some(format!("Calling Glen at {}...", self.hatch.number()));
        let hatch = Arc::clone(&self.hatch);
        self.dial_task = Some(tokio::task::spawn_blocking(move || hatch.dial()));
    }

    pub async fn poll_dial(&mut self) {
        if self.dial_task.as_ref().is_some_and(|task| task.is_finished()) {
            self.finish_dial().await;
        }
    }

    pub async fn finish_dial(&mut self) {
        let Some(task) = self.dial_task.take() else {
            return;
        };
        self.status = Some(match task.await {
            Ok(DialOutcome::Launched(uri)) => {
                format!("Calling Glen ({})", uri.trim_start_matches("tel:"))
            }
            Ok(DialOutcome::InContext(uri)) => {
                format!("Call Glen at {}", uri.trim_start_matches("tel:"))
            }
            Err(e) => {
                tracing::warn!(error = %e, "dial task failed");
                format!("Call Glen at {}", self.hatch.number())
            }
        });
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Draft editing, cursor counted in characters

    pub fn insert_char(&mut self, c: char) {
        let draft = self.session.draft_mut();
        let byte_pos = char_to_byte_index(draft, self.cursor);
        draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let draft = self.session.draft_mut();
            let byte_pos = char_to_byte_index(draft, self.cursor);
            draft.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        let draft = self.session.draft_mut();
        if self.cursor < draft.chars().count() {
            let byte_pos = char_to_byte_index(draft, self.cursor);
            draft.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.session.draft().chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.session.draft().chars().count();
    }

    pub fn clear_draft(&mut self) {
        self.session.set_draft("");
        self.cursor = 0;
    }

    // Chat scrolling; render clamps and re-pins to the bottom

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn page_size(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
