//! YAML Configuration Tree
//!
//! Read-only view over a parsed configuration document, replacing the
//! iterator state machine of lib/app/ogs-yaml.c with a borrowed node type
//! that callers descend recursively.

use std::borrow::Cow;
use std::str::FromStr;

use serde_yaml::Value;
use thiserror::Error;

/// YAML parsing errors
#[derive(Error, Debug)]
pub enum YamlError {
    #[error("YAML parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid value `{value}` for key `{key}`")]
    InvalidValue { key: String, value: String },
}

/// Borrowed node inside an [`OgsYamlDocument`]
#[derive(Debug, Clone, Copy)]
pub struct YamlNode<'a> {
    value: &'a Value,
}

impl<'a> YamlNode<'a> {
    pub fn new(value: &'a Value) -> Self {
        // Tags carry no meaning for configuration
        let value = match value {
            Value::Tagged(tagged) => &tagged.value,
            other => other,
        };
        YamlNode { value }
    }

    /// Key/value pairs of a mapping in document order.
    ///
    /// Non-string keys are skipped; any other node type yields nothing.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, YamlNode<'a>)> + 'a {
        let map = match self.value {
            Value::Mapping(map) => Some(map),
            _ => None,
        };
        map.into_iter()
            .flat_map(|map| map.iter())
            .filter_map(|(k, v)| k.as_str().map(|k| (k, YamlNode::new(v))))
    }

    /// Child of a mapping by key
    pub fn get(&self, key: &str) -> Option<YamlNode<'a>> {
        match self.value {
            Value::Mapping(map) => map.get(key).map(YamlNode::new),
            _ => None,
        }
    }

    /// Array view with sequence-or-single normalization
    /// (OGS_YAML_ARRAY_NEXT/OGS_YAML_ARRAY_RECURSE)
    ///
    /// A sequence yields its items, a lone mapping yields itself, and a
    /// scalar or null yields nothing.
    pub fn elements(&self) -> Vec<YamlNode<'a>> {
        match self.value {
            Value::Sequence(seq) => seq.iter().map(YamlNode::new).collect(),
            Value::Mapping(_) => vec![*self],
            _ => Vec::new(),
        }
    }

    /// Scalar value rendered as text (ogs_yaml_iter_value)
    pub fn scalar(&self) -> Option<Cow<'a, str>> {
        match self.value {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    /// Scalar value as an owned string
    pub fn value_string(&self) -> Option<String> {
        self.scalar().map(Cow::into_owned)
    }

    /// Parse a scalar into `T`.
    ///
    /// Returns `Ok(None)` when the node holds no scalar, and an
    /// [`YamlError::InvalidValue`] naming `key` when the text does not parse.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, YamlError> {
        let Some(text) = self.scalar() else {
            return Ok(None);
        };
        let parsed = text.trim().parse::<T>();
        match parsed {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(YamlError::InvalidValue {
                key: key.to_string(),
                value: text.into_owned(),
            }),
        }
    }
}

/// YAML document wrapper
#[derive(Debug, Clone)]
pub struct OgsYamlDocument {
    root: Value,
}

impl OgsYamlDocument {
    /// Parse YAML from a string
    pub fn from_str(yaml_str: &str) -> Result<Self, YamlError> {
        let root: Value =
            serde_yaml::from_str(yaml_str).map_err(|e| YamlError::ParseError(e.to_string()))?;
        Ok(OgsYamlDocument { root })
    }

    /// Parse YAML from a file
    pub fn from_file(path: &str) -> Result<Self, YamlError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// An empty document (no sections)
    pub fn empty() -> Self {
        OgsYamlDocument {
            root: Value::Mapping(Default::default()),
        }
    }

    pub fn root(&self) -> YamlNode<'_> {
        YamlNode::new(&self.root)
    }

    /// Get a node by dotted key path (e.g. "global.max.ue")
    pub fn get(&self, path: &str) -> Option<YamlNode<'_>> {
        path.split('.')
            .try_fold(self.root(), |node, part| node.get(part))
    }
}
