//! Output rendering abstraction for aether.
//!
//! Defines the [`Renderer`] trait that decouples a turn's progress from the
//! display layer. [`StdoutRenderer`] prints text as it streams and shows tool
//! activity as dimmed status lines on stderr.

use colored::Colorize;
use std::io::{self, Write};

use crate::message::{ToolCallRequest, ToolCallResult};

/// Receives everything a turn produces while it runs.
pub trait Renderer {
    /// Render a single text fragment as it arrives.
    fn render_token(&mut self, token: &str);

    /// The model started producing text for this turn.
    fn activity_started(&mut self) {}

    /// A tool call is about to run.
    fn tool_start(&mut self, call: &ToolCallRequest);

    /// A tool call finished (successfully or not).
    fn tool_result(&mut self, call: &ToolCallRequest, result: &ToolCallResult);

    /// Called when the full response is complete.
    fn render_done(&mut self);

    /// Called when the turn fails.
    fn render_error(&mut self, err: &str);
}

/// Renders streaming output directly to stdout.
///
/// Each fragment is printed immediately with an explicit flush so the user
/// sees a "typing" effect.
pub struct StdoutRenderer {
    fragment_count: usize,
    tool_calls: usize,
    /// Whether the cursor sits mid-line after streamed text.
    mid_line: bool,
    /// The activity notice was already shown this turn.
    announced: bool,
}

impl Default for StdoutRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutRenderer {
    pub fn new() -> Self {
        Self {
            fragment_count: 0,
            tool_calls: 0,
            mid_line: false,
            announced: false,
        }
    }

    fn reset(&mut self) {
        self.fragment_count = 0;
        self.tool_calls = 0;
        self.announced = false;
    }

    fn break_line(&mut self) {
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
    }
}

impl Renderer for StdoutRenderer {
    fn render_token(&mut self, token: &str) {
        print!("{}", token);
        io::stdout().flush().ok();
        self.fragment_count += 1;
        self.mid_line = !token.ends_with('\n');
    }

    fn activity_started(&mut self) {
        if self.announced {
            return;
        }
        self.break_line();
        eprintln!("{}", "Assistant started responding...".dimmed());
        self.announced = true;
    }

    fn tool_start(&mut self, call: &ToolCallRequest) {
        self.break_line();
        self.tool_calls += 1;
        eprintln!(
            "{} {}",
            format!("[{}]", call.tool_name).cyan(),
            summarize(&call.arguments).dimmed()
        );
    }

    fn tool_result(&mut self, call: &ToolCallRequest, result: &ToolCallResult) {
        if result.is_error() {
            eprintln!(
                "{} {}",
                format!("[{}]", call.tool_name).red(),
                summarize(result.output_text())
            );
        } else {
            let bytes = result.output_text().len();
            eprintln!(
                "{}",
                format!("[{}] done ({} bytes)", call.tool_name, bytes).dimmed()
            );
        }
    }

    fn render_done(&mut self) {
        self.break_line();
        println!();
        let summary = if self.tool_calls > 0 {
            format!("[{} fragments, {} tool calls]", self.fragment_count, self.tool_calls)
        } else {
            format!("[{} fragments]", self.fragment_count)
        };
        println!("{}", summary.dimmed());
        self.reset();
    }

    fn render_error(&mut self, err: &str) {
        self.break_line();
        eprintln!("{} {}", "error:".red().bold(), err);
        self.reset();
    }
}

/// First line of `text`, cut to a readable length.
fn summarize(text: &str) -> String {
    const MAX: usize = 100;
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > MAX {
        let cut: String = line.chars().take(MAX).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
