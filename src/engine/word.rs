use serde::{Deserialize, Serialize};

/// Separators tried in priority order. The first one present anywhere in the
/// line wins, so `a b | c` splits on the pipe.
pub const SEPARATORS: [char; 3] = ['|', '\t', ' '];

/// One translation pair. Sets and maps of entries are keyed by [`WordEntry::key`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub foreign: String,
    pub native: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineError {
    MissingSeparator,
    EmptyForeign,
    EmptyNative,
}

impl LineError {
    pub fn as_str(self) -> &'static str {
        match self {
            LineError::MissingSeparator => "no separator",
            LineError::EmptyForeign => "empty foreign term",
            LineError::EmptyNative => "empty native term",
        }
    }
}

impl WordEntry {
    pub fn new(foreign: impl Into<String>, native: impl Into<String>) -> Self {
        Self {
            foreign: foreign.into(),
            native: native.into(),
        }
    }

    /// Dedup and ordering key.
    pub fn key(&self) -> &str {
        &self.foreign
    }

    pub fn is_valid(&self) -> bool {
        !self.foreign.is_empty() && !self.native.is_empty()
    }

    /// Parse one source line. `Ok(None)` means the line carried nothing
    /// (blank or comment only).
    pub fn parse_line(line: &str) -> Result<Option<Self>, LineError> {
        let content = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let content = trim_blank(content);
        if content.is_empty() {
            return Ok(None);
        }

        let pos = SEPARATORS
            .iter()
            .find_map(|&sep| content.find(sep))
            .ok_or(LineError::MissingSeparator)?;

        // Every separator is a single byte, so `pos + 1` is a char boundary.
        let foreign = trim_blank(&content[..pos]);
        let native = trim_blank(&content[pos + 1..]);

        if foreign.is_empty() {
            return Err(LineError::EmptyForeign);
        }
        if native.is_empty() {
            return Err(LineError::EmptyNative);
        }
        Ok(Some(Self::new(foreign, native)))
    }
}

fn trim_blank(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '\t' || c == '\r')
}
