//! Accumulates piped text and decodes the packet(s) inside it.
//!
//! Upstream stages print their packet on a line of its own, but a human may
//! paste a block that also carries labels (`JSON PACKET: {...}`) or chatter
//! around it. Decoding therefore runs in two passes:
//!
//! - **direct**: the whole block is read as a stream of JSON documents
//!   (one per line, or pretty-printed across lines)
//! - **screen**: only if the direct pass fails, each line is decoded on its
//!   own, falling back to the first balanced `{...}` span embedded in it.
//!   Lines yielding neither are treated as prose.
//!
//! Every decoded fragment is merged into one document, last write wins.

use crate::packet::{self, Packet};
use serde_json::Value;
use std::ops::Range;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Could not extract a JSON packet from {lines} line(s) of input")]
    NoPacket { lines: usize },
}

#[derive(Debug, Clone)]
pub struct PacketStore {
    text: String,
    splat: bool,
    screen: bool,
    cascade: Option<Packet>,
}

impl PacketStore {
    pub fn new() -> Self {
        PacketStore {
            text: String::new(),
            splat: true,
            screen: false,
            cascade: None,
        }
    }

    /// Whether selecting a one-element list yields its element (default on).
    pub fn with_splat(mut self, splat: bool) -> Self {
        self.splat = splat;
        self
    }

    /// Skip the direct pass and screen every line.
    pub fn with_screen(mut self, screen: bool) -> Self {
        self.screen = screen;
        self
    }

    /// Overrides stamped into the document after every fragment is merged.
    pub fn with_cascade(mut self, overrides: Packet) -> Self {
        self.cascade = Some(overrides);
        self
    }

    pub fn splat(&self) -> bool {
        self.splat
    }

    pub fn accept<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.text.push_str(line.as_ref());
            self.text.push('\n');
        }
    }

    /// True when nothing but whitespace has been accepted.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// The merged document of everything accepted so far.
    pub fn all_data(&self) -> Result<Value, DecodeError> {
        let direct = if self.screen { None } else { self.direct() };

        let document = match direct {
            Some(document) => document,
            None => {
                debug!("Direct JSON decode failed, screening input line by line");
                self.screened().ok_or(DecodeError::NoPacket {
                    lines: self.text.lines().count(),
                })?
            }
        };

        Ok(match &self.cascade {
            Some(overrides) => packet::cascade(document, overrides),
            None => document,
        })
    }

    fn direct(&self) -> Option<Value> {
        let mut document = None;
        for item in serde_json::Deserializer::from_str(&self.text).into_iter::<Value>() {
            let fragment = item.ok()?;
            if !is_document(&fragment) {
                return None;
            }
            document = Some(packet::merge(document, fragment));
        }
        document
    }

    fn screened(&self) -> Option<Value> {
        let mut document = None;
        for line in self.text.lines() {
            if let Some(fragment) = screen_line(line) {
                document = Some(packet::merge(document, fragment));
            }
        }
        document
    }
}

impl Default for PacketStore {
    fn default() -> Self {
        Self::new()
    }
}

fn is_document(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn screen_line(line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Ok(fragment) = serde_json::from_str::<Value>(line)
        && is_document(&fragment)
    {
        return Some(fragment);
    }

    let mut from = 0;
    while let Some(span) = find_object(line, from) {
        if let Ok(fragment) = serde_json::from_str::<Value>(&line[span.clone()]) {
            return Some(fragment);
        }
        from = span.start + 1;
    }
    None
}

/// Byte range of the first balanced `{...}` starting at or after `from`.
///
/// Braces inside JSON string literals do not count. A `{` that never closes
/// is skipped and the search resumes at the next one.
pub(crate) fn find_object(text: &str, from: usize) -> Option<Range<usize>> {
    let mut start = from + text.get(from..)?.find('{')?;
    loop {
        if let Some(end) = balanced_end(&text[start..]) {
            return Some(start..start + end);
        }
        start = start + 1 + text[start + 1..].find('{')?;
    }
}

/// Length of the balanced object at the head of `text`, which starts with `{`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
