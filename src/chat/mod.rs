mod client;
mod session;
mod stream;

pub use client::{ChatClient, StreamRequest, ToolExecutionResult, STREAM_PATH, TOOL_CONFIRM_PATH};
pub use session::{ChatSession, Turn, GOAL_COACH_PROMPT};
pub use stream::{parse_line, ChatEvent, ChatStream, StreamDecoder, StreamOutcome, DONE_SENTINEL};
