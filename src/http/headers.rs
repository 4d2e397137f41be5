//! Header field collection and its line-wise parser.

use std::collections::HashMap;

use crate::http::parser::{ParseError, find_crlf};

const CRLF: &[u8] = b"\r\n";

/// Case-insensitive collection of header fields.
///
/// Parsed names are stored lower-cased. Repeated names are folded into a
/// single value joined with `", "` in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Parses at most one header line from the front of `buf`.
    ///
    /// Returns `(consumed, done)`:
    ///
    /// - `(2, true)` when `buf` starts with the blank line ending the block
    /// - `(0, false)` when no complete line is available yet
    /// - `(line + 2, false)` after a field was stored
    ///
    /// A line must be UTF-8 and the name must sit flush against both the
    /// start of the line and the colon. Anything else, including obsolete
    /// line folding, is a [`ParseError::MalformedHeaderLine`].
    pub fn parse(&mut self, buf: &[u8]) -> Result<(usize, bool), ParseError> {
        if buf.starts_with(CRLF) {
            return Ok((2, true));
        }

        let Some(end) = find_crlf(buf) else {
            return Ok((0, false));
        };

        let line = std::str::from_utf8(&buf[..end]).map_err(|_| {
            ParseError::MalformedHeaderLine(String::from_utf8_lossy(&buf[..end]).into_owned())
        })?;

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeaderLine(line.to_string()))?;

        // Rejects "Host : x" and continuation lines such as " Host: x"
        if key.trim() != key {
            return Err(ParseError::MalformedHeaderLine(line.to_string()));
        }

        if !is_valid_name(key) {
            return Err(ParseError::InvalidHeaderName(key.to_string()));
        }

        self.append(key.to_ascii_lowercase(), value.trim());

        Ok((end + 2, false))
    }

    fn append(&mut self, key: String, value: &str) {
        self.fields
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    /// Case-insensitive lookup. Absent fields read as `""`.
    pub fn get(&self, key: &str) -> &str {
        if let Some(v) = self.fields.get(&key.to_ascii_lowercase()) {
            return v;
        }

        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Replaces any value stored under `key`, keeping the name as given.
    ///
    /// Used for outgoing headers, where the wire spelling matters.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.fields.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.fields.insert(key, value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// RFC 9110 `tchar`.
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// A field name is a non-empty run of `tchar`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_tchar)
}
