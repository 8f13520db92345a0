//! Path expressions for addressing document values
//!
//! Grammar:
//!
//! ```text
//! path     = segment ("/" segment)*
//! segment  = prefix ":" field selector?
//! selector = "[" (integer | language-tag | empty) "]"
//! ```
//!
//! Examples:
//! - `dc:format` - simple property
//! - `dc:creator[1]` - array item by position (0-based)
//! - `dc:title[de]` - alternative text entry by language
//! - `dc:title[]` - default entry of an alternative text, first item of an array
//! - `xmpMM:History[0]/stEvt:action` - field of a structure inside an array
//! - `xmpMM:Pantry[0]/dc:format` - value inside a pantry extension
//! - `dc:` - a whole namespace (delete only)

use crate::core::error::{XmpError, XmpResult};
use std::fmt;
use std::str::FromStr;

/// Slot selector following a field name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Selector {
    /// No brackets: the whole field
    None,
    /// `[]`: default entry or first element
    Default,
    /// `[N]`: positional index
    Index(usize),
    /// `[lang]`: alternative text entry by language
    Lang(String),
}

impl Selector {
    fn parse(inner: &str) -> XmpResult<Self> {
        if inner.is_empty() {
            return Ok(Selector::Default);
        }
        if inner.bytes().all(|b| b.is_ascii_digit()) {
            return inner
                .parse::<usize>()
                .map(Selector::Index)
                .map_err(|_| XmpError::BadXPath(format!("Invalid array index: {}", inner)));
        }
        if !inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(XmpError::BadXPath(format!(
                "Invalid language tag: {}",
                inner
            )));
        }
        Ok(Selector::Lang(inner.to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::None => Ok(()),
            Selector::Default => f.write_str("[]"),
            Selector::Index(i) => write!(f, "[{}]", i),
            Selector::Lang(lang) => write!(f, "[{}]", lang),
        }
    }
}

/// One `prefix:field[selector]` step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PathSegment {
    /// Namespace prefix
    pub prefix: String,
    /// Field name (empty for a whole-namespace segment)
    pub name: String,
    /// Slot selector
    pub selector: Selector,
}

impl PathSegment {
    /// Create a segment addressing a whole field
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            selector: Selector::None,
        }
    }

    /// Replace the selector
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Whether the segment names a namespace rather than a field
    pub fn is_namespace(&self) -> bool {
        self.name.is_empty()
    }

    fn parse(s: &str) -> XmpResult<Self> {
        let colon = s
            .find(':')
            .ok_or_else(|| XmpError::BadXPath(format!("Missing namespace prefix in '{}'", s)))?;
        let prefix = &s[..colon];
        let rest = &s[colon + 1..];
        if prefix.is_empty() {
            return Err(XmpError::BadXPath(format!("Empty namespace prefix in '{}'", s)));
        }
        if !is_name(prefix) {
            return Err(XmpError::BadXPath(format!("Invalid namespace prefix '{}'", prefix)));
        }

        let (name, selector) = match rest.find('[') {
            Some(open) => {
                let inner = rest[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| XmpError::BadXPath(format!("Unclosed bracket in '{}'", s)))?;
                if inner.contains('[') || inner.contains(']') {
                    return Err(XmpError::BadXPath(format!("Unexpected bracket in '{}'", s)));
                }
                (&rest[..open], Selector::parse(inner)?)
            }
            None => {
                if rest.contains(']') {
                    return Err(XmpError::BadXPath("Unexpected ']'".to_string()));
                }
                (rest, Selector::None)
            }
        };

        if name.is_empty() && selector != Selector::None {
            return Err(XmpError::BadXPath(format!("Selector without field in '{}'", s)));
        }
        if !name.is_empty() && !is_name(name) {
            return Err(XmpError::BadXPath(format!("Invalid field name '{}'", name)));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            selector,
        })
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.prefix, self.name, self.selector)
    }
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Build a path from segments
    pub fn from_segments(segments: Vec<PathSegment>) -> XmpResult<Self> {
        if segments.is_empty() {
            return Err(XmpError::BadXPath("Empty path".to_string()));
        }
        if segments[..segments.len() - 1]
            .iter()
            .any(PathSegment::is_namespace)
        {
            return Err(XmpError::BadXPath(
                "Namespace segment must be the last segment".to_string(),
            ));
        }
        Ok(Self { segments })
    }

    /// All segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// First segment
    pub fn first(&self) -> &PathSegment {
        &self.segments[0]
    }

    /// Last segment
    pub fn last(&self) -> &PathSegment {
        &self.segments[self.segments.len() - 1]
    }

    /// Namespace prefix of the first segment
    pub fn namespace(&self) -> &str {
        &self.first().prefix
    }

    /// Whether the path is a bare `prefix:` namespace path
    pub fn is_namespace(&self) -> bool {
        self.segments.len() == 1 && self.first().is_namespace()
    }
}

impl FromStr for Path {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Parse a path expression
pub fn parse_path(path: &str) -> XmpResult<Path> {
    let path = path.trim();
    if path.is_empty() {
        return Err(XmpError::BadXPath("Empty path".to_string()));
    }
    let segments = path
        .split('/')
        .map(PathSegment::parse)
        .collect::<XmpResult<Vec<_>>>()?;
    Path::from_segments(segments)
}

fn is_name(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_path() {
        let path = parse_path("xmp:CreatorTool").unwrap();
        assert_eq!(path.segments().len(), 1);
        assert_eq!(path.first(), &PathSegment::new("xmp", "CreatorTool"));
        assert_eq!(path.namespace(), "xmp");
    }

    #[test]
    fn test_parse_selectors() {
        let path = parse_path("dc:creator[1]").unwrap();
        assert_eq!(path.first().selector, Selector::Index(1));

        let path = parse_path("dc:title[de-CH]").unwrap();
        assert_eq!(path.first().selector, Selector::Lang("de-CH".to_string()));

        let path = parse_path("dc:title[]").unwrap();
        assert_eq!(path.first().selector, Selector::Default);

        let path = parse_path("dc:title[x-default]").unwrap();
        assert_eq!(
            path.first().selector,
            Selector::Lang("x-default".to_string())
        );
    }

    #[test]
    fn test_parse_nested_path() {
        let path = parse_path("xmpMM:Pantry[0]/dc:format").unwrap();
        assert_eq!(path.segments().len(), 2);
        assert_eq!(
            path.segments()[0],
            PathSegment::new("xmpMM", "Pantry").with_selector(Selector::Index(0))
        );
        assert_eq!(path.last(), &PathSegment::new("dc", "format"));
    }

    #[test]
    fn test_namespace_path() {
        let path = parse_path("dc:").unwrap();
        assert!(path.is_namespace());
        assert!(parse_path("dc:/xmp:Label").is_err());
        assert!(parse_path("dc:[0]").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_path("").is_err());
        assert!(parse_path("format").is_err());
        assert!(parse_path(":format").is_err());
        assert!(parse_path("dc:title[en").is_err());
        assert!(parse_path("dc:title]").is_err());
        assert!(parse_path("dc:title[a b]").is_err());
        assert!(parse_path("dc:title[0]x").is_err());
    }

    #[test]
    fn test_round_trip() {
        for s in [
            "dc:format",
            "dc:creator[3]",
            "dc:title[]",
            "dc:title[en-US]",
            "xmpMM:History[0]/stEvt:action",
            "xmpMM:Pantry[2]/xmpMM:History[1]/stEvt:when",
            "exif:",
        ] {
            let path: Path = s.parse().unwrap();
            assert_eq!(path.to_string(), s);
            assert_eq!(path.to_string().parse::<Path>().unwrap(), path);
        }
    }
}
