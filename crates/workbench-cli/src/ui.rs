//! Terminal implementation of the host UI capabilities.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use workbench_core::error::{Result, WorkbenchError};
use workbench_core::node::NodeUi;

/// Answers node prompts from command-line arguments, falling back to stdin.
pub struct ConsoleUi {
    assume_yes: bool,
    answer: Option<String>,
}

impl ConsoleUi {
    pub fn new(assume_yes: bool, answer: Option<String>) -> Self {
        Self { assume_yes, answer }
    }

    fn read_line(prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl NodeUi for ConsoleUi {
    fn input_box(&self, prompt: &str, value: &str) -> Option<String> {
        if let Some(answer) = &self.answer {
            return Some(answer.clone());
        }
        Self::read_line(&format!("{} [{}]: ", prompt, value)).filter(|line| !line.is_empty())
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        matches!(
            Self::read_line(&format!("{} [y/N] ", message))
                .map(|line| line.trim().to_lowercase())
                .as_deref(),
            Some("y") | Some("yes")
        )
    }

    fn show_info(&self, message: &str) {
        println!("{}", message);
    }

    fn show_error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }

    fn execute_command(&self, command: &str, args: &[String]) -> Result<()> {
        tracing::info!("[Console] Running command {}", command);
        if args.is_empty() {
            println!("{} {}", "▶".green(), command);
        } else {
            println!("{} {} {}", "▶".green(), command, args.join(" "));
        }
        Ok(())
    }

    fn open_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(WorkbenchError::Io {
                message: format!("{} does not exist", path.display()),
            });
        }
        println!("{}", path.display());
        Ok(())
    }
}
