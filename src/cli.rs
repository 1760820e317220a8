use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "journal")]
#[command(about = "Terminal client for the journal backend", long_about = None)]
pub struct Args {
    #[arg(
        long = "api-url",
        global = true,
        help = "Backend base URL (e.g., http://localhost:5000/api/v1)"
    )]
    pub api_url: Option<String>,

    #[arg(short = 'v', long = "verbose", global = true, help = "Print request diagnostics")]
    pub verbose: bool,

    #[arg(long = "no-tools", global = true, help = "Don't let the assistant propose actions")]
    pub no_tools: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with email and password
    Login {
        email: String,
    },
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Enter the verification code sent by email
    Verify {
        email: String,
        #[arg(long, help = "Send a new code first")]
        resend: bool,
    },
    /// Forget the stored credentials
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Chat with the assistant
    Chat {
        #[arg(short = 'c', long = "conversation", help = "Continue a conversation")]
        conversation: Option<String>,
        #[arg(long = "system-prompt")]
        system_prompt: Option<String>,
        #[arg(long = "goal", help = "Let the assistant help you set a goal")]
        goal: bool,
        #[arg(short = 'y', long = "yes", help = "Confirm proposed actions without asking")]
        yes: bool,
        #[arg(help = "Message to send; starts an interactive chat when omitted")]
        message: Vec<String>,
    },
    /// Manage chat conversations
    Conversations {
        #[command(subcommand)]
        action: ConversationAction,
    },
    /// Manage goals
    Goals {
        #[command(subcommand)]
        action: GoalAction,
    },
    /// Read and write journal entries
    Entries {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Manage journal templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Weekly AI insights
    Insights {
        #[command(subcommand)]
        action: InsightAction,
    },
    /// Documents used as chat context
    Documents {
        #[command(subcommand)]
        action: DocumentAction,
    },
    /// Push notification subscription
    Push {
        #[command(subcommand)]
        action: PushAction,
    },
    /// Show the week containing a date
    Week {
        #[arg(help = "Date as YYYY-MM-DD, defaults to today")]
        date: Option<String>,
        #[arg(long, conflicts_with = "prev")]
        next: bool,
        #[arg(long)]
        prev: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConversationAction {
    List,
    Create {
        #[arg(long)]
        title: Option<String>,
    },
    Show { id: String },
    Rename { id: String, title: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum GoalAction {
    List {
        #[arg(long, help = "active, completed, paused or abandoned")]
        status: Option<String>,
    },
    Show {
        id: String,
    },
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "target-date")]
        target_date: Option<String>,
    },
    Progress {
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },
    Complete {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum EntryAction {
    List {
        #[arg(long = "type", help = "daily, weekly or monthly")]
        entry_type: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    Show {
        id: String,
    },
    /// Write an entry from stdin, auto-saving while you type
    Write {
        #[arg(long = "type", default_value = "daily")]
        entry_type: String,
        #[arg(long, help = "Entry date, defaults to today")]
        date: Option<String>,
        #[arg(long)]
        template: Option<String>,
        #[arg(long, help = "Continue editing an existing entry")]
        id: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    List,
    Show {
        id: String,
    },
    Create {
        name: String,
        #[arg(long = "type", default_value = "daily")]
        entry_type: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(
            long = "prompt",
            required = true,
            help = "Question, optionally followed by |placeholder; repeat for more"
        )]
        prompts: Vec<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "prompt", help = "Replaces all prompts; repeat for more")]
        prompts: Vec<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum InsightAction {
    List,
    /// Show the insight for the week containing a date
    Week { date: Option<String> },
    /// Generate the insight for the week containing a date
    Generate { date: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum DocumentAction {
    List,
    Upload { path: PathBuf },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum PushAction {
    Status,
    Subscribe,
    Unsubscribe,
    Test,
}
