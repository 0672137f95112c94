use std::collections::BTreeMap;

pub const DELIMITER: &str = "---";

/// Key/value metadata from the delimited block at the top of an issue body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: BTreeMap<String, String>,
}

impl Header {
    /// Parse the header block and return it together with the text that follows it.
    ///
    /// The body must open with a line that is exactly `---`, and the block ends at
    /// the next such line. Without both delimiters the header is empty and the
    /// whole body is returned as the remainder.
    pub fn parse(body: &str) -> (Header, &str) {
        let mut header = Header::default();

        let Some(after_open) = strip_delimiter_line(body) else {
            return (header, body);
        };

        let mut offset = 0;
        for line in after_open.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if content == DELIMITER {
                let rest = &after_open[offset + line.len()..];
                return (header, rest);
            }
            if let Some((key, value)) = parse_entry(content) {
                header.entries.insert(key.to_string(), value.to_string());
            }
            offset += line.len();
        }

        // Unterminated block: treat as no header at all.
        (Header::default(), body)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strip_delimiter_line(body: &str) -> Option<&str> {
    let (first, rest) = match body.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (body, ""),
    };
    (first.trim_end_matches('\r') == DELIMITER).then_some(rest)
}

/// `key: value` with an ASCII word key and a non-empty value.
fn parse_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((key, value))
}
