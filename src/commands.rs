use colored::*;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;

use journal_client::api::ApiClient;
use journal_client::auth::{AuthStore, FilesystemAuthStore};
use journal_client::autosave::{AutoSaver, JournalDraft};
use journal_client::chat::{ChatClient, ChatEvent, ChatSession};
use journal_client::cli::{
    Command, ConversationAction, DocumentAction, EntryAction, GoalAction, InsightAction,
    PushAction, TemplateAction,
};
use journal_client::config::Config;
use journal_client::error::{JournalError, Result};
use journal_client::models::{
    CreateGoalRequest, CreateTemplateRequest, EntryType, GoalStatus, JournalQuery,
    TemplatePrompt, UpdateGoalRequest, UpdateTemplateRequest,
};
use journal_client::otp::OtpCountdown;
use journal_client::push::{DevicePushPlatform, PushSubscriptionManager};
use journal_client::ui::{
    confirm, display_conversations, display_document, display_error, display_goal,
    display_insight, display_journal, display_message, display_push_state, display_success,
    display_template, display_tool_call, StreamPrinter,
};
use journal_client::week;

const MAX_OTP_ATTEMPTS: usize = 3;

pub async fn run(command: Command, config: &Config) -> Result<()> {
    let auth: Arc<dyn AuthStore> = Arc::new(FilesystemAuthStore::new(&config.cache_dir));
    let api = ApiClient::from_config(config, auth)?;

    match command {
        Command::Login { email } => login(&api, &email).await,
        Command::Register { email, name } => register(&api, &email, &name).await,
        Command::Verify { email, resend } => {
            if resend {
                api.resend_otp(&email).await?;
                display_success("A new code is on its way.");
            }
            verify(&api, &email).await
        }
        Command::Logout => {
            api.logout()?;
            display_success("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            let user = api.current_user().await?;
            println!("{} {}", user.name.as_deref().unwrap_or(""), user.email.dimmed());
            Ok(())
        }
        Command::Chat {
            conversation,
            system_prompt,
            goal,
            yes,
            message,
        } => {
            let client = ChatClient::from_config(api, config);
            let mut session = if goal {
                ChatSession::goal_generator(client)
            } else {
                ChatSession::new(
                    client,
                    system_prompt.or_else(|| config.system_prompt.clone()),
                    config.enable_tools,
                )
            };
            chat(&mut session, conversation, yes, message).await
        }
        Command::Conversations { action } => conversations(&api, action).await,
        Command::Goals { action } => goals(&api, action).await,
        Command::Entries { action } => entries(&api, config, action).await,
        Command::Templates { action } => templates(&api, action).await,
        Command::Insights { action } => insights(&api, action).await,
        Command::Documents { action } => documents(&api, action).await,
        Command::Push { action } => push(api, config, action).await,
        Command::Week { date, next, prev } => show_week(date, next, prev),
    }
}

fn prompt_err(e: dialoguer::Error) -> JournalError {
    JournalError::Other(format!("prompt failed: {}", e))
}

fn password() -> Result<String> {
    if let Ok(password) = std::env::var("JOURNAL_PASSWORD") {
        return Ok(password);
    }
    dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(prompt_err)
}

async fn login(api: &ApiClient, email: &str) -> Result<()> {
    let password = password()?;
    let user = api.login(email, &password).await?;
    display_success(&format!("Logged in as {}.", user.email));
    Ok(())
}

async fn register(api: &ApiClient, email: &str, name: &str) -> Result<()> {
    let password = password()?;
    match api.register(name, email, &password).await? {
        Some(user) => {
            display_success(&format!("Welcome, {}!", user.name.as_deref().unwrap_or(&user.email)));
            Ok(())
        }
        None => {
            println!("{}", "We sent a verification code to your email.".cyan());
            verify(api, email).await
        }
    }
}

async fn verify(api: &ApiClient, email: &str) -> Result<()> {
    let countdown = OtpCountdown::default();

    for attempt in 1..=MAX_OTP_ATTEMPTS {
        if countdown.is_expired() {
            break;
        }
        let code: String = dialoguer::Input::new()
            .with_prompt(format!("Code (expires in {})", countdown.display()))
            .interact_text()
            .map_err(prompt_err)?;
        if countdown.is_expired() {
            break;
        }

        match api.verify_otp(email, code.trim()).await {
            Ok(user) => {
                display_success(&format!("Verified. Logged in as {}.", user.email));
                return Ok(());
            }
            Err(JournalError::ApiError { message, .. }) if attempt < MAX_OTP_ATTEMPTS => {
                display_error(&message);
            }
            Err(e) => return Err(e),
        }
    }

    Err(JournalError::AuthError(format!(
        "Verification code expired. Run `journal verify {} --resend` for a new one",
        email
    )))
}

async fn chat(
    session: &mut ChatSession,
    conversation: Option<String>,
    auto_confirm: bool,
    message: Vec<String>,
) -> Result<()> {
    if let Some(id) = conversation {
        session.load(&id).await?;
        for message in session.messages() {
            display_message(message);
        }
    }

    if !message.is_empty() {
        return run_turn(session, &message.join(" "), auto_confirm).await;
    }

    println!(
        "{}",
        "Type a message. /new starts a new conversation, /exit quits.".dimmed()
    );
    loop {
        let line: String = dialoguer::Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)?;

        match line.trim() {
            "" => continue,
            "/exit" | "/quit" => break,
            "/new" => {
                session.reset();
                println!("{}", "Started a new conversation.".dimmed());
            }
            text => match run_turn(session, text, auto_confirm).await {
                Ok(()) => {}
                Err(JournalError::Unauthorized) => return Err(JournalError::Unauthorized),
                // The turn was rolled back; the conversation stays usable
                Err(e) => display_error(&e.to_string()),
            },
        }
    }

    if let Some(id) = session.conversation_id() {
        println!("{}", format!("Conversation: {}", id).dimmed());
    }
    Ok(())
}

async fn run_turn(session: &mut ChatSession, text: &str, auto_confirm: bool) -> Result<()> {
    let mut printer = StreamPrinter::new();
    {
        let mut turn = session.begin_turn(text).await?;
        while let Some(event) = turn.next_event().await {
            match event {
                Ok(ChatEvent::Content(chunk)) => printer.print(&chunk)?,
                Ok(ChatEvent::Done) => break,
                Ok(_) => {}
                Err(e) => {
                    printer.finish()?;
                    return Err(e);
                }
            }
        }
    }
    printer.finish()?;

    let tool_call = match session.pending_tool_call() {
        Some(tool_call) => tool_call.clone(),
        None => return Ok(()),
    };

    display_tool_call(&tool_call);
    let confirmed = auto_confirm || confirm("Run this action?", false)?;
    let result = if confirmed {
        session.confirm_pending_tool().await
    } else {
        session.cancel_pending_tool().await
    };

    match result {
        Ok(message) => display_success(&message),
        Err(JournalError::Unauthorized) => return Err(JournalError::Unauthorized),
        Err(e) => display_error(&format!("Action failed: {}", e)),
    }
    Ok(())
}

async fn conversations(api: &ApiClient, action: ConversationAction) -> Result<()> {
    match action {
        ConversationAction::List => display_conversations(&api.list_conversations().await?),
        ConversationAction::Create { title } => {
            let conversation = api.create_conversation(title).await?;
            display_success(&format!(
                "Created conversation {}. Continue it with `journal chat -c {}`.",
                conversation.id, conversation.id
            ));
        }
        ConversationAction::Show { id } => {
            let conversation = api.get_conversation(&id).await?;
            println!("{}", conversation.title.bold());
            for message in &conversation.messages {
                display_message(message);
            }
        }
        ConversationAction::Rename { id, title } => {
            api.rename_conversation(&id, &title).await?;
            display_success("Conversation renamed.");
        }
        ConversationAction::Delete { id } => {
            api.delete_conversation(&id).await?;
            display_success("Conversation deleted.");
        }
    }
    Ok(())
}

async fn goals(api: &ApiClient, action: GoalAction) -> Result<()> {
    match action {
        GoalAction::List { status } => {
            let status = status.as_deref().map(parse_goal_status).transpose()?;
            let goals = api.list_goals(status).await?;
            if goals.is_empty() {
                println!("{}", "No goals yet. Try `journal chat --goal`.".dimmed());
            }
            for goal in &goals {
                display_goal(goal);
            }
        }
        GoalAction::Show { id } => display_goal(&api.get_goal(&id).await?),
        GoalAction::Create {
            title,
            description,
            category,
            target_date,
        } => {
            if let Some(date) = &target_date {
                week::parse_date(date)?;
            }
            let request = CreateGoalRequest {
                title,
                description,
                category,
                target_date,
                milestones: Vec::new(),
            };
            let goal = api.create_goal(&request).await?;
            display_goal(&goal);
        }
        GoalAction::Progress { id, percent } => {
            let request = UpdateGoalRequest {
                progress: Some(percent),
                ..Default::default()
            };
            display_goal(&api.update_goal(&id, &request).await?);
        }
        GoalAction::Complete { id } => {
            let request = UpdateGoalRequest {
                status: Some(GoalStatus::Completed),
                progress: Some(100),
                ..Default::default()
            };
            display_goal(&api.update_goal(&id, &request).await?);
        }
        GoalAction::Delete { id } => {
            api.delete_goal(&id).await?;
            display_success("Goal deleted.");
        }
    }
    Ok(())
}

fn parse_goal_status(status: &str) -> Result<GoalStatus> {
    serde_json::from_value(serde_json::Value::String(status.to_lowercase())).map_err(|_| {
        JournalError::Other(format!(
            "unknown status '{}' (expected active, completed, paused or abandoned)",
            status
        ))
    })
}

async fn entries(api: &ApiClient, config: &Config, action: EntryAction) -> Result<()> {
    match action {
        EntryAction::List {
            entry_type,
            from,
            to,
            limit,
        } => {
            let query = JournalQuery {
                entry_type: entry_type
                    .as_deref()
                    .map(str::parse::<EntryType>)
                    .transpose()?,
                start_date: from,
                end_date: to,
                limit: Some(limit),
            };
            let entries = api.list_journals(&query).await?;
            if entries.is_empty() {
                println!("{}", "No entries found.".dimmed());
            }
            for entry in &entries {
                display_journal(entry, false);
            }
        }
        EntryAction::Show { id } => display_journal(&api.get_journal(&id).await?, true),
        EntryAction::Write {
            entry_type,
            date,
            template,
            id,
        } => write_entry(api, config, &entry_type, date, template, id).await?,
        EntryAction::Delete { id } => {
            api.delete_journal(&id).await?;
            display_success("Entry deleted.");
        }
    }
    Ok(())
}

async fn write_entry(
    api: &ApiClient,
    config: &Config,
    entry_type: &str,
    date: Option<String>,
    template: Option<String>,
    id: Option<String>,
) -> Result<()> {
    let entry_type: EntryType = entry_type.parse()?;
    let date = match date {
        Some(date) => week::format_date(week::parse_date(&date)?),
        None => week::format_date(week::today()),
    };

    let mut draft = match &id {
        Some(id) => api.get_journal(id).await?.content,
        None => String::new(),
    };
    if let Some(template_id) = &template {
        if draft.is_empty() {
            draft = api.get_template(template_id).await?.to_skeleton();
        }
    }
    if !draft.is_empty() {
        print!("{}", draft);
        if !draft.ends_with('\n') {
            println!();
        }
    }

    let sink = Arc::new(JournalDraft::new(
        api.clone(),
        entry_type,
        date.clone(),
        template,
        id,
    ));
    let saver = AutoSaver::spawn(sink.clone(), Duration::from_secs(config.autosave_idle_secs));

    println!(
        "{}",
        format!(
            "Writing {} entry for {}. Saved after {}s of quiet; Ctrl-D to finish.",
            entry_type, date, config.autosave_idle_secs
        )
        .dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        draft.push_str(&line);
        draft.push('\n');
        saver.edit(draft.clone());
    }

    let report = saver.close().await?;
    match (sink.entry_id().await, report.last_error) {
        (Some(id), None) => display_success(&format!("Saved entry {}.", id)),
        (Some(id), Some(error)) => {
            display_error(&format!("Entry {} may be missing your last edits: {}", id, error))
        }
        (None, Some(error)) => return Err(JournalError::Other(error)),
        (None, None) => println!("{}", "Nothing written.".dimmed()),
    }
    Ok(())
}

async fn templates(api: &ApiClient, action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::List => {
            for template in &api.list_templates().await? {
                display_template(template);
            }
        }
        TemplateAction::Show { id } => display_template(&api.get_template(&id).await?),
        TemplateAction::Create {
            name,
            entry_type,
            description,
            prompts,
        } => {
            let request = CreateTemplateRequest {
                name,
                description,
                entry_type: entry_type.parse()?,
                prompts: prompts.iter().map(|p| TemplatePrompt::parse(p)).collect(),
            };
            display_template(&api.create_template(&request).await?);
        }
        TemplateAction::Update {
            id,
            name,
            description,
            prompts,
        } => {
            let request = UpdateTemplateRequest {
                name,
                description,
                prompts: if prompts.is_empty() {
                    None
                } else {
                    Some(prompts.iter().map(|p| TemplatePrompt::parse(p)).collect())
                },
            };
            display_template(&api.update_template(&id, &request).await?);
        }
        TemplateAction::Delete { id } => {
            api.delete_template(&id).await?;
            display_success("Template deleted.");
        }
    }
    Ok(())
}

async fn insights(api: &ApiClient, action: InsightAction) -> Result<()> {
    match action {
        InsightAction::List => {
            let insights = api.list_insights().await?;
            if insights.is_empty() {
                println!("{}", "No insights yet.".dimmed());
            }
            for insight in &insights {
                display_insight(insight);
                println!();
            }
        }
        InsightAction::Week { date } => {
            let date = date.unwrap_or_else(|| week::format_date(week::today()));
            if week::is_future_week(&date)? {
                println!("{}", "That week hasn't happened yet.".dimmed());
                return Ok(());
            }
            let week_start = week::get_week_start(&date)?;
            match api.get_weekly_insight(&week_start).await? {
                Some(insight) => display_insight(&insight),
                None => println!(
                    "{}",
                    format!("No insight for {} yet.", week::format_week_range(&date)?).dimmed()
                ),
            }
        }
        InsightAction::Generate { date } => {
            let date = date.unwrap_or_else(|| week::format_date(week::today()));
            if week::is_future_week(&date)? {
                return Err(JournalError::Other(
                    "Insights can't be generated for future weeks".to_string(),
                ));
            }
            let insight = api.generate_insight(&week::get_week_start(&date)?).await?;
            display_insight(&insight);
        }
    }
    Ok(())
}

async fn documents(api: &ApiClient, action: DocumentAction) -> Result<()> {
    match action {
        DocumentAction::List => {
            for document in &api.list_documents().await? {
                display_document(document);
            }
        }
        DocumentAction::Upload { path } => {
            let document = api.upload_document(&path).await?;
            display_document(&document);
        }
        DocumentAction::Delete { id } => {
            api.delete_document(&id).await?;
            display_success("Document deleted.");
        }
    }
    Ok(())
}

async fn push(api: ApiClient, config: &Config, action: PushAction) -> Result<()> {
    let platform = DevicePushPlatform::new(
        &config.cache_dir,
        config.push_relay_url.clone(),
        std::io::stdin().is_terminal(),
    );
    let mut manager = PushSubscriptionManager::new(Arc::new(platform), api, config.push.clone());
    manager.init().await;

    let ok = match action {
        PushAction::Status => {
            display_push_state(manager.state());
            return Ok(());
        }
        PushAction::Subscribe => manager.subscribe().await,
        PushAction::Unsubscribe => manager.unsubscribe().await,
        PushAction::Test => manager.send_test().await,
    };

    if ok {
        display_push_state(manager.state());
        Ok(())
    } else {
        let error = manager
            .state()
            .error
            .clone()
            .unwrap_or_else(|| "Push request failed".to_string());
        Err(JournalError::Other(error))
    }
}

fn show_week(date: Option<String>, next: bool, prev: bool) -> Result<()> {
    let date = date.unwrap_or_else(|| week::format_date(week::today()));
    let date = if next {
        week::get_next_week(&date)?
    } else if prev {
        week::get_previous_week(&date)?
    } else {
        week::get_week_start(&date)?
    };

    let marker = if week::is_current_week(&date)? {
        " (this week)".green()
    } else if week::is_future_week(&date)? {
        " (upcoming)".yellow()
    } else {
        "".normal()
    };
    println!("{}{}", week::format_week_range(&date)?, marker);
    println!(
        "{}",
        format!("{} → {}", date, week::get_week_end(&date)?).dimmed()
    );
    Ok(())
}
