mod output;

pub use output::{
    confirm, display_conversations, display_document, display_error, display_goal,
    display_insight, display_journal, display_message, display_push_state, display_success,
    display_template, display_tool_call, StreamPrinter,
};
