use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid JSON pointer '{input}': {message}")]
pub struct PointerError {
    pub input: String,
    pub message: String,
}

/// A parsed JSON Pointer: a sequence of decoded reference tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `input`. The empty string is the root; anything else must start
    /// with `/`. Each segment is decoded with `~1` → `/` and `~0` → `~`.
    pub fn parse(input: &str) -> Result<Self, PointerError> {
        if input.is_empty() {
            return Ok(Self::root());
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Err(PointerError {
                input: input.to_string(),
                message: "pointer must start with '/'".to_string(),
            });
        };

        let segments = rest
            .split('/')
            .map(|raw| decode_segment(input, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment and the segments leading to it.
    pub fn split_last(&self) -> Option<(&str, &[String])> {
        self.segments
            .split_last()
            .map(|(last, parents)| (last.as_str(), parents))
    }

    pub fn as_string(&self) -> String {
        self.segments
            .iter()
            .map(|segment| format!("/{}", encode_segment(segment)))
            .collect()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

fn decode_segment(input: &str, raw: &str) -> Result<String, PointerError> {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '~' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => decoded.push('~'),
            Some('1') => decoded.push('/'),
            other => {
                return Err(PointerError {
                    input: input.to_string(),
                    message: match other {
                        Some(c) => format!("invalid escape sequence '~{c}'"),
                        None => "dangling '~' at end of segment".to_string(),
                    },
                });
            }
        }
    }

    Ok(decoded)
}

fn encode_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_path() {
        let pointer = JsonPointer::parse("/a/b/0").unwrap();
        assert_eq!(pointer.segments(), &["a", "b", "0"]);
        let (last, parents) = pointer.split_last().unwrap();
        assert_eq!(last, "0");
        assert_eq!(parents, &["a", "b"]);
    }

    #[test]
    fn parse_escaped_segments() {
        let pointer = JsonPointer::parse("/a~1b/m~0n/~01").unwrap();
        assert_eq!(pointer.segments(), &["a/b", "m~n", "~1"]);
        assert_eq!(pointer.to_string(), "/a~1b/m~0n/~01");
    }

    #[test]
    fn empty_string_is_root() {
        let pointer = JsonPointer::parse("").unwrap();
        assert!(pointer.is_root());
        assert!(pointer.split_last().is_none());
    }

    #[test]
    fn slash_addresses_the_empty_key() {
        let pointer = JsonPointer::parse("/").unwrap();
        assert_eq!(pointer.segments(), &[""]);
    }

    #[test]
    fn rejects_malformed_pointers() {
        assert!(JsonPointer::parse("a/b").is_err());
        let err = JsonPointer::parse("/a~2").unwrap_err();
        assert!(err.message.contains("~2"));
        assert!(JsonPointer::parse("/a~").is_err());
    }
}
