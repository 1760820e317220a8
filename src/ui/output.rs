use crate::error::{JournalError, Result};
use crate::models::{
    ConversationSummary, Document, Goal, Insight, JournalEntry, JournalTemplate, Message, Role,
    ToolCallData,
};
use crate::push::{Permission, PushSubscriptionState};
use colored::*;
use std::io::{self, Write};
use std::time::{Duration, Instant};

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red(), message);
}

pub fn display_success(message: &str) {
    println!("{}", message.green());
}

/// Ask a yes/no question on the terminal.
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| JournalError::Other(format!("prompt failed: {}", e)))
}

/// Display a proposed action in a boxed format
pub fn display_tool_call(tool_call: &ToolCallData) {
    println!();
    println!("{}", format!("┌─ ACTION: {}", tool_call.tool_name).yellow());
    let message = if tool_call.display_message.is_empty() {
        "The assistant wants to run this action."
    } else {
        tool_call.display_message.as_str()
    };
    for line in message.lines() {
        println!("{} {}", "│".yellow(), line);
    }
    if let Some(params) = &tool_call.params {
        if let Ok(pretty) = serde_json::to_string_pretty(params) {
            for line in pretty.lines() {
                println!("{} {}", "│".yellow(), line.dimmed());
            }
        }
    }
    println!("{}", "└──────────────────────────────".yellow());
}

pub fn display_message(message: &Message) {
    match message.role {
        Role::User => println!("{} {}", "you ›".cyan().bold(), message.content),
        Role::Assistant => println!("{} {}", "ai  ›".magenta().bold(), message.content),
    }
}

pub fn display_conversations(conversations: &[ConversationSummary]) {
    if conversations.is_empty() {
        println!("{}", "No conversations yet.".dimmed());
        return;
    }
    for conversation in conversations {
        let title = if conversation.title.is_empty() {
            "(untitled)"
        } else {
            conversation.title.as_str()
        };
        println!(
            "{}  {}  {}",
            conversation.id.dimmed(),
            title,
            conversation.updated_at.as_deref().unwrap_or("").dimmed()
        );
    }
}

pub fn display_goal(goal: &Goal) {
    let bar_width = 20usize;
    let filled = (goal.progress.min(100) as usize * bar_width) / 100;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(bar_width - filled));
    println!(
        "{}  {} [{}] {}%  {}",
        goal.id.dimmed(),
        goal.title.bold(),
        bar.green(),
        goal.progress,
        goal.status.to_string().cyan()
    );
    if let Some(target) = &goal.target_date {
        println!("    {}", format!("target: {}", target).dimmed());
    }
    for milestone in &goal.milestones {
        let mark = if milestone.completed { "✓" } else { "·" };
        println!("    {} {}", mark, milestone.title);
    }
}

pub fn display_journal(entry: &JournalEntry, full: bool) {
    let title = entry.title.as_deref().unwrap_or("");
    println!(
        "{}  {} {}  {}",
        entry.id.dimmed(),
        entry.date.bold(),
        entry.entry_type.to_string().cyan(),
        title
    );
    if full {
        println!();
        println!("{}", entry.content);
        if !entry.tags.is_empty() {
            println!();
            println!("{}", format!("tags: {}", entry.tags.join(", ")).dimmed());
        }
    }
}

pub fn display_template(template: &JournalTemplate) {
    let default_marker = if template.is_default { " (default)" } else { "" };
    println!(
        "{}  {} {}{}",
        template.id.dimmed(),
        template.name.bold(),
        template.entry_type.to_string().cyan(),
        default_marker.dimmed()
    );
    for prompt in &template.prompts {
        println!("    - {}", prompt.question);
    }
}

pub fn display_insight(insight: &Insight) {
    println!("{}", format!("Week of {}", insight.week_start).bold());
    println!("{}", insight.summary);
    if !insight.highlights.is_empty() {
        println!("{}", "Highlights:".green());
        for item in &insight.highlights {
            println!("  • {}", item);
        }
    }
    if !insight.suggestions.is_empty() {
        println!("{}", "Suggestions:".cyan());
        for item in &insight.suggestions {
            println!("  • {}", item);
        }
    }
}

pub fn display_document(document: &Document) {
    println!(
        "{}  {}  {}",
        document.id.dimmed(),
        document.filename,
        document.status.as_deref().unwrap_or("").dimmed()
    );
}

pub fn display_push_state(state: &PushSubscriptionState) {
    let yes_no = |flag: bool| if flag { "yes".green() } else { "no".red() };
    println!("supported:   {}", yes_no(state.is_supported));
    let permission = match state.permission {
        Permission::Granted => "granted".green(),
        Permission::Denied => "denied".red(),
        Permission::Default => "not asked".yellow(),
    };
    println!("permission:  {}", permission);
    println!("subscribed:  {}", yes_no(state.is_subscribed));
    if state.permission == Permission::Denied {
        println!(
            "{}",
            "Notifications are blocked. Change the permission in your settings to enable them."
                .yellow()
        );
    }
    if let Some(error) = &state.error {
        display_error(error);
    }
}

/// Prints streamed assistant text as it arrives.
pub struct StreamPrinter {
    last_flush: Instant,
    flush_interval: Duration,
    started: bool,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self {
            last_flush: Instant::now(),
            flush_interval: Duration::from_millis(50),
            started: false,
        }
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        if !self.started {
            print!("{} ", "ai  ›".magenta().bold());
            self.started = true;
        }
        print!("{}", text);
        if self.last_flush.elapsed() > self.flush_interval {
            io::stdout().flush()?;
            self.last_flush = Instant::now();
        }
        Ok(())
    }

    pub fn finish(&mut self) -> io::Result<()> {
        if self.started {
            println!();
        }
        self.started = false;
        io::stdout().flush()
    }
}

impl Default for StreamPrinter {
    fn default() -> Self {
        Self::new()
    }
}
