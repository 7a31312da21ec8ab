use std::collections::VecDeque;

use bracket_terminal::prelude::{RGB, WHITE};

#[derive(Clone, Debug, PartialEq)]
pub struct LogLine {
    pub text: String,
    pub color: RGB,
}

/// Player-facing message log. Messages are word-wrapped to `width` columns
/// and only the newest `capacity` lines are kept.
#[derive(Clone, Debug)]
pub struct MessageLog {
    lines: VecDeque<LogLine>,
    capacity: usize,
    width: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(6, 58)
    }
}

impl MessageLog {
    pub fn new(capacity: usize, width: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            width: width.max(1),
        }
    }

    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.push_color(entry, RGB::named(WHITE));
    }

    pub fn push_color<S: Into<String>>(&mut self, entry: S, color: RGB) {
        let entry = entry.into();
        log::trace!("message: {entry}");
        for text in wrap_words(&entry, self.width) {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(LogLine { text, color });
        }
    }

    /// Restores lines verbatim, still honoring the capacity.
    pub fn push_line(&mut self, line: LogLine) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last_text(&self) -> Option<&str> {
        self.lines.back().map(|line| line.text.as_str())
    }
}

pub(crate) fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(width)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
