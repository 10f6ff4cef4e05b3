//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/history`, `/thread` and `/help`. Returns a [`CommandAction`]
//! so the REPL loop can decide how to proceed.

use colored::Colorize;

use crate::message::{Message, Role};
use crate::session::ConversationSession;

/// Action returned by slash command handling.
pub(crate) enum CommandAction {
    /// Command was handled successfully; continue the REPL loop.
    Continue,
    /// Unknown command was entered.
    Unknown(String),
}

pub(crate) fn handle_slash_command(command: &str, session: &ConversationSession) -> CommandAction {
    match command {
        "/history" => {
            let history = session.history();
            if history.is_empty() {
                println!("{}", "No messages yet.".dimmed());
            }
            for msg in &history {
                println!("{}", format_message(msg));
                println!();
            }
            CommandAction::Continue
        }
        "/thread" => {
            match session.current_thread_id() {
                Some(id) => println!("{} {}", "thread:".bold(), id),
                None => println!("{}", "No thread yet; it is created with the first message.".dimmed()),
            }
            println!("{} {}", "session:".bold(), session.id());
            println!(
                "{} {}",
                "started:".bold(),
                session.created_at().format("%Y-%m-%d %H:%M:%S UTC")
            );
            CommandAction::Continue
        }
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - show the remote thread id", "/thread".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - cancel the reply in progress", "Ctrl+C".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            CommandAction::Continue
        }
        _ => CommandAction::Unknown(command.to_string()),
    }
}

fn format_message(msg: &Message) -> String {
    let label = match msg.role {
        Role::User => msg.role.to_string().green().bold(),
        Role::Assistant => msg.role.to_string().cyan().bold(),
    };
    let time = msg.timestamp.format("%H:%M").to_string();
    format!("{} {}\n{}", label, time.dimmed(), msg.content)
}
