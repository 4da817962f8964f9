//! Rendered output produced by the terminal.
//!
//! Front ends drain `Output` items in order; styles are hints only.

/// Presentation hint for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    /// Echo of a submitted command.
    Prompt,
    Info,
    Error,
    Banner,
    /// Emphasized frame line (live clock, active animation row).
    Highlight,
    /// De-emphasized frame line.
    Dim,
    /// Bold green.
    Success,
    /// Bold red, for effects rather than failures.
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Line { style: LineStyle, text: String },
    /// Clear everything rendered so far.
    Clear,
}

/// Ordered output buffer written by handlers and drained by the front end.
#[derive(Debug, Default)]
pub struct Screen {
    items: Vec<Output>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, style: LineStyle, text: impl Into<String>) {
        self.items.push(Output::Line {
            style,
            text: text.into(),
        });
    }

    pub fn plain(&mut self, text: impl Into<String>) {
        self.line(LineStyle::Plain, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.line(LineStyle::Info, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.line(LineStyle::Error, text);
    }

    pub fn prompt(&mut self, command: &str) {
        self.line(LineStyle::Prompt, format!("> {command}"));
    }

    pub fn clear(&mut self) {
        self.items.push(Output::Clear);
    }

    /// Takes every pending item, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<Output> {
        std::mem::take(&mut self.items)
    }

    pub fn pending(&self) -> &[Output] {
        &self.items
    }
}
