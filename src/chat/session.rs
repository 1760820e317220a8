use crate::chat::client::ChatClient;
use crate::chat::stream::{ChatEvent, ChatStream, StreamOutcome};
use crate::error::{JournalError, Result};
use crate::models::{Message, Role, ToolCallData};

pub const GOAL_COACH_PROMPT: &str = "You are a goal-setting coach inside a personal journal. \
Help the user turn what they want into one specific, measurable goal with a realistic \
target date and a few milestones. Ask at most one clarifying question at a time. When the \
goal is clear, propose creating it with the create_goal tool.";

/// State of one chat conversation: transcript, id and the pending action.
///
/// At most one tool call is pending at a time; a new message cannot be sent
/// until it is confirmed or cancelled.
pub struct ChatSession {
    client: ChatClient,
    conversation_id: Option<String>,
    messages: Vec<Message>,
    pending_tool_call: Option<ToolCallData>,
    system_prompt: Option<String>,
    enable_tools: bool,
}

impl ChatSession {
    pub fn new(client: ChatClient, system_prompt: Option<String>, enable_tools: bool) -> Self {
        Self {
            client,
            conversation_id: None,
            messages: Vec::new(),
            pending_tool_call: None,
            system_prompt,
            enable_tools,
        }
    }

    /// Session preset for the goal generator.
    pub fn goal_generator(client: ChatClient) -> Self {
        Self::new(client, Some(GOAL_COACH_PROMPT.to_string()), true)
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_tool_call(&self) -> Option<&ToolCallData> {
        self.pending_tool_call.as_ref()
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Replace the transcript with a stored conversation.
    pub async fn load(&mut self, conversation_id: &str) -> Result<()> {
        let conversation = self.client.api().get_conversation(conversation_id).await?;
        self.conversation_id = Some(conversation.id);
        self.messages = conversation.messages;
        self.pending_tool_call = None;
        Ok(())
    }

    /// Start over with a fresh, not yet created conversation.
    pub fn reset(&mut self) {
        self.conversation_id = None;
        self.messages.clear();
        self.pending_tool_call = None;
    }

    /// Send a user message and open the assistant's reply.
    ///
    /// The user message is appended optimistically and removed again if the
    /// request fails.
    pub async fn begin_turn(&mut self, text: &str) -> Result<Turn<'_>> {
        if let Some(pending) = &self.pending_tool_call {
            return Err(JournalError::ToolCallPending(pending.tool_name.clone()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(JournalError::Other("Message is empty".to_string()));
        }

        let start = self.messages.len();
        self.messages.push(Message::user(text));

        let opened = self
            .client
            .stream_message(
                text,
                self.conversation_id.as_deref(),
                self.system_prompt.as_deref(),
                self.enable_tools,
            )
            .await;

        match opened {
            Ok(stream) => Ok(Turn {
                session: self,
                stream,
                start,
                outcome: StreamOutcome::default(),
            }),
            Err(e) => {
                self.rollback(start);
                Err(e)
            }
        }
    }

    /// Send a message and wait for the whole reply.
    pub async fn send(&mut self, text: &str) -> Result<StreamOutcome> {
        self.begin_turn(text).await?.finish().await
    }

    /// Execute the pending action. The result, good or bad, is appended to
    /// the transcript as an assistant message; the pending call is cleared
    /// either way.
    pub async fn confirm_pending_tool(&mut self) -> Result<String> {
        self.resolve_pending_tool(true).await
    }

    /// Discard the pending action.
    pub async fn cancel_pending_tool(&mut self) -> Result<String> {
        self.resolve_pending_tool(false).await
    }

    async fn resolve_pending_tool(&mut self, confirmed: bool) -> Result<String> {
        let tool_call = self
            .pending_tool_call
            .take()
            .ok_or_else(|| JournalError::Other("No action is waiting for confirmation".to_string()))?;

        let conversation_id = tool_call
            .conversation_id
            .clone()
            .or_else(|| self.conversation_id.clone());

        let result = self
            .client
            .confirm_tool_execution(&tool_call.tool_call_id, confirmed, conversation_id.as_deref())
            .await;

        match result {
            Ok(result) => {
                let text = result.message.unwrap_or_else(|| {
                    if confirmed {
                        format!("Done: {}", describe(&tool_call))
                    } else {
                        "Okay, I won't do that.".to_string()
                    }
                });
                self.messages.push(Message::assistant(text.clone()));
                Ok(text)
            }
            Err(e) => {
                self.messages.push(Message::assistant(format!(
                    "Sorry, I couldn't complete \"{}\": {}",
                    describe(&tool_call),
                    e
                )));
                Err(e)
            }
        }
    }

    fn apply(&mut self, start: usize, event: &ChatEvent) {
        match event {
            ChatEvent::Content(text) => {
                // The reply is the message right after the user's turn
                match self.messages.get_mut(start + 1) {
                    Some(reply) if reply.role == Role::Assistant => reply.content.push_str(text),
                    _ => self.messages.push(Message::assistant(text.clone())),
                }
            }
            ChatEvent::ToolCall(tool_call) => {
                if self.pending_tool_call.is_none() {
                    if self.conversation_id.is_none() {
                        self.conversation_id = tool_call.conversation_id.clone();
                    }
                    self.pending_tool_call = Some(tool_call.clone());
                }
            }
            ChatEvent::Conversation(id) => self.conversation_id = Some(id.clone()),
            ChatEvent::Done => {}
        }
    }

    fn rollback(&mut self, start: usize) {
        self.messages.truncate(start);
        self.pending_tool_call = None;
    }
}

fn describe(tool_call: &ToolCallData) -> &str {
    if tool_call.display_message.is_empty() {
        &tool_call.tool_name
    } else {
        &tool_call.display_message
    }
}

/// One in-flight assistant reply. Each event is applied to the session as
/// it is read; an error rolls the turn back.
pub struct Turn<'a> {
    session: &'a mut ChatSession,
    stream: ChatStream,
    start: usize,
    outcome: StreamOutcome,
}

impl Turn<'_> {
    pub async fn next_event(&mut self) -> Option<Result<ChatEvent>> {
        match self.stream.next_event().await? {
            Ok(event) => {
                self.session.apply(self.start, &event);
                match &event {
                    ChatEvent::Content(text) => self.outcome.content.push_str(text),
                    ChatEvent::ToolCall(tool_call) if self.outcome.tool_call.is_none() => {
                        self.outcome.tool_call = Some(tool_call.clone());
                    }
                    _ => {}
                }
                self.outcome.conversation_id = self.session.conversation_id.clone();
                Some(Ok(event))
            }
            Err(e) => {
                self.session.rollback(self.start);
                Some(Err(e))
            }
        }
    }

    /// Read the remaining events and return what the turn produced.
    pub async fn finish(mut self) -> Result<StreamOutcome> {
        while let Some(event) = self.next_event().await {
            if let ChatEvent::Done = event? {
                break;
            }
        }
        Ok(self.outcome)
    }
}
