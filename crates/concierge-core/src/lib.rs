pub mod ai;
pub mod config;
pub mod dial;
pub mod error;
pub mod format;
pub mod markup;
pub mod persona;
pub mod provider;
pub mod state;

// Re-export main types for convenience
pub use ai::{ClaudeClient, Completion, CompletionRequest, ConciergeClient, GeminiClient, OllamaClient, OpenAIClient};
pub use config::Config;
pub use dial::{DialOutcome, EscapeHatch, Launcher, SystemLauncher};
pub use error::{FailureKind, RemoteCallFailed};
pub use format::format_response;
pub use markup::{parse_markup, to_plain_text, Segment};
pub use persona::{CallToAction, Persona};
pub use provider::Provider;
pub use state::{Phase, Sender, Session, SessionView, Turn};
