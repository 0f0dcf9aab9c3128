//! Data Path Value Object
//!
//! Addresses a value inside the JSON data tree: `causante.causanteNif`,
//! `reducciones[0].importeReal` or `reducciones.0.importeReal`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// One step of a data path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Error when a path string is malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataPathError {
    Empty,
    EmptySegment { path: String },
    BadIndex { path: String },
}

impl fmt::Display for DataPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataPathError::Empty => write!(f, "data path is empty"),
            DataPathError::EmptySegment { path } => {
                write!(f, "data path '{path}' has an empty segment")
            }
            DataPathError::BadIndex { path } => {
                write!(f, "data path '{path}' has a malformed [index]")
            }
        }
    }
}

impl std::error::Error for DataPathError {}

/// A parsed, validated data path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataPath {
    raw: String,
    segments: Vec<Segment>,
}

impl DataPath {
    pub fn parse(raw: &str) -> Result<Self, DataPathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DataPathError::Empty);
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            if part.is_empty() {
                return Err(DataPathError::EmptySegment {
                    path: trimmed.to_string(),
                });
            }
            let (head, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if !head.is_empty() {
                segments.push(match head.parse::<usize>() {
                    Ok(index) => Segment::Index(index),
                    Err(_) => Segment::Key(head.to_string()),
                });
            }
            while !rest.is_empty() {
                let bad = || DataPathError::BadIndex {
                    path: trimmed.to_string(),
                };
                let close = rest.find(']').ok_or_else(bad)?;
                if !rest.starts_with('[') {
                    return Err(bad());
                }
                let index = rest[1..close].parse::<usize>().map_err(|_| bad())?;
                segments.push(Segment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Top-level section this path starts in, if it starts with a key
    pub fn section(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Key(k)) => Some(k),
            _ => None,
        }
    }

    /// Follow the path through `root`.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match (segment, current) {
                (Segment::Key(k), Value::Object(map)) => map.get(k)?,
                (Segment::Index(i), Value::Array(items)) => items.get(*i)?,
                // Objects keyed by digits ("16", "605") are reachable too.
                (Segment::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl FromStr for DataPath {
    type Err = DataPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_dotted_keys() {
        let path = DataPath::parse("causante.causanteNif").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("causante".into()),
                Segment::Key("causanteNif".into())
            ]
        );
        assert_eq!(path.section(), Some("causante"));
    }

    #[test]
    fn bracket_and_dot_indices_are_equivalent() {
        let a = DataPath::parse("reducciones[1].clave").unwrap();
        let b = DataPath::parse("reducciones.1.clave").unwrap();
        assert_eq!(a.segments(), b.segments());
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(DataPath::parse("  "), Err(DataPathError::Empty));
        assert!(matches!(
            DataPath::parse("a..b"),
            Err(DataPathError::EmptySegment { .. })
        ));
        assert!(matches!(
            DataPath::parse("a[x]"),
            Err(DataPathError::BadIndex { .. })
        ));
        assert!(matches!(
            DataPath::parse("a[1"),
            Err(DataPathError::BadIndex { .. })
        ));
    }

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let tree = json!({
            "reducciones": [{"clave": "01"}, {"clave": "02"}],
            "liquidacion": {"casillasAntesReducciones": {"605": 1000}}
        });
        let path = DataPath::parse("reducciones[1].clave").unwrap();
        assert_eq!(path.lookup(&tree), Some(&json!("02")));

        let path = DataPath::parse("liquidacion.casillasAntesReducciones.605").unwrap();
        assert_eq!(path.lookup(&tree), Some(&json!(1000)));

        let path = DataPath::parse("reducciones[5].clave").unwrap();
        assert_eq!(path.lookup(&tree), None);
    }
}
