mod auth;
pub mod client;
mod conversations;
mod documents;
pub mod envelope;
mod goals;
mod insights;
mod journals;
mod push;
mod templates;

pub use client::ApiClient;
pub use conversations::CreateConversationRequest;
pub use envelope::{extract_error_message, ApiResponse};
