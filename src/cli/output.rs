//! Colored output helpers for CLI

use owo_colors::OwoColorize;
use std::io::{self, Write};

pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "DocChat".bright_cyan().bold(),
                version.dimmed(),
                "Chat, or upload a document and ask about it".bright_white()
            );
        } else {
            println!(
                "\n   DocChat {}\n   Chat, or upload a document and ask about it\n",
                version
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("  {}", message.dimmed().italic());
        } else {
            println!("  [TIP] {}", message);
        }
    }

    /// Print the REPL prompt, tagged with the current mode, without a newline.
    pub fn prompt(&self, mode: &str) {
        if self.colored {
            print!("{} {} ", format!("[{}]", mode).dimmed(), "you>".bright_cyan().bold());
        } else {
            print!("[{}] you> ", mode);
        }
        io::stdout().flush().ok();
    }

    /// Print an assistant reply.
    pub fn answer(&self, text: &str) {
        if self.colored {
            println!("{} {}\n", "bot>".bright_green().bold(), text);
        } else {
            println!("bot> {}\n", text);
        }
    }
}
