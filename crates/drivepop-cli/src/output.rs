//! Terminal output for commands
//!
//! Human mode prints summaries line by line. JSON mode keeps stdout for the
//! single result document and sends only warnings and errors to stderr,
//! one JSON object per line.

use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        self == OutputFormat::Json
    }
}

/// Kind of a one-line message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    /// Headline of a completed step
    Done,
    /// Indented detail under a headline
    Detail,
    Warning,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Decides where a message goes and what it looks like, if anywhere
fn render(format: OutputFormat, tone: Tone, message: &str) -> Option<(Stream, String)> {
    match (format, tone) {
        (OutputFormat::Human, Tone::Done) => Some((Stream::Stdout, message.to_string())),
        (OutputFormat::Human, Tone::Detail) => Some((Stream::Stdout, format!("    {message}"))),
        (OutputFormat::Human, Tone::Warning) => Some((Stream::Stderr, format!("warning: {message}"))),
        (OutputFormat::Human, Tone::Failure) => Some((Stream::Stderr, format!("error: {message}"))),
        (OutputFormat::Json, Tone::Warning) => Some((
            Stream::Stderr,
            json!({"level": "warning", "message": message}).to_string(),
        )),
        (OutputFormat::Json, Tone::Failure) => Some((
            Stream::Stderr,
            json!({"level": "error", "message": message}).to_string(),
        )),
        (OutputFormat::Json, Tone::Done | Tone::Detail) => None,
    }
}

/// Prints command results in the selected [`OutputFormat`]
pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn emit(&self, tone: Tone, message: &str) {
        match render(self.format, tone, message) {
            Some((Stream::Stdout, line)) => println!("{line}"),
            Some((Stream::Stderr, line)) => eprintln!("{line}"),
            None => {}
        }
    }

    pub fn done(&self, message: &str) {
        self.emit(Tone::Done, message);
    }

    pub fn detail(&self, message: &str) {
        self.emit(Tone::Detail, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Tone::Warning, message);
    }

    pub fn failure(&self, message: &str) {
        self.emit(Tone::Failure, message);
    }

    /// Prints the result document; a no-op in human mode
    pub fn document(&self, value: &serde_json::Value) {
        if self.format.is_json() {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
    }
}

/// "1 file" / "2 files"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
