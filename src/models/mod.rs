mod chat;
mod document;
mod goal;
mod insight;
mod journal;
mod template;
mod user;

pub use chat::{Conversation, ConversationSummary, Message, Role, ToolCallData};
pub use document::Document;
pub use goal::{CreateGoalRequest, Goal, GoalStatus, Milestone, UpdateGoalRequest};
pub use insight::Insight;
pub use journal::{CreateJournalRequest, EntryType, JournalEntry, JournalQuery, UpdateJournalRequest};
pub use template::{CreateTemplateRequest, JournalTemplate, TemplatePrompt, UpdateTemplateRequest};
pub use user::{AuthData, LoginRequest, RegisterRequest, User, VerifyOtpRequest};
