//! Terminal reporting for `warden-server` subcommands.
//!
//! Every line is a status tag followed by a message. With colors disabled
//! the tag is a bracketed word so output stays greppable in scripts and CI.

use owo_colors::OwoColorize;

/// Kind of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Info,
    Warn,
    Error,
    Created,
    Skipped,
}

impl Status {
    fn plain_tag(self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Info => "[INFO]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERROR]",
            Status::Created => "[CREATED]",
            Status::Skipped => "[SKIPPED]",
        }
    }

    fn colored_tag(self) -> String {
        match self {
            Status::Ok | Status::Created => "✓".green().bold().to_string(),
            Status::Info => "•".blue().to_string(),
            Status::Warn => "!".yellow().bold().to_string(),
            Status::Error => "✗".red().bold().to_string(),
            Status::Skipped => "○".yellow().to_string(),
        }
    }
}

/// Reporter for CLI subcommands.
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

    /// Renders one status line without printing it.
    pub fn render(&self, status: Status, message: &str) -> String {
        if self.colored {
            format!("  {} {}", status.colored_tag(), message)
        } else {
            format!("  {} {}", status.plain_tag(), message)
        }
    }

    fn emit(&self, status: Status, message: &str) {
        let line = self.render(status, message);
        if status == Status::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n   {} {}\n", "warden".bright_cyan().bold(), version.dimmed());
        } else {
            println!("\n   warden {}\n", version);
        }
    }

    pub fn success(&self, message: &str) {
        self.emit(Status::Ok, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Status::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Status::Warn, message);
    }

    /// Goes to stderr.
    pub fn error(&self, message: &str) {
        self.emit(Status::Error, message);
    }

    /// Reports a scaffolded file or directory, e.g. `created("config", "warden.toml")`.
    pub fn created(&self, kind: &str, path: &str) {
        self.emit(Status::Created, &format!("{} {}", kind, path));
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        self.emit(Status::Skipped, &format!("{} ({})", path, reason));
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bold().underline());
        } else {
            println!("\n  == {} ==", title);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed());
        } else {
            println!("\n  [HINT] {}", message);
        }
    }

    /// Shell command the operator should run next.
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    pub fn newline(&self) {
        println!();
    }
}
