//! Front-matter extraction.
//!
//! Splits a Markdown document into its leading `---` delimited YAML block and
//! the remaining body. The YAML is parsed with `serde_yaml` and converted to
//! `serde_json` values so validators and the dashboard export share one value
//! model. Parse failures are returned as data so one malformed file never
//! aborts a batch.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

/// Delimiter line that opens and closes a front-matter block.
pub const DELIMITER: &str = "---";

/// Errors produced while extracting front matter from a single file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontMatterError {
    /// Opening delimiter found but no closing one.
    #[error("front matter block is not terminated by a closing `---` line")]
    Unterminated,

    /// The block is not valid YAML.
    #[error("{0}")]
    Yaml(String),

    /// The block parsed, but not to a key/value mapping.
    #[error("front matter must be a mapping, found {0}")]
    NotAMapping(&'static str),

    /// The file itself could not be read.
    #[error("could not read file: {0}")]
    Unreadable(String),
}

/// Key/value record parsed from a front-matter block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Look up a dot-separated path such as `governance.nfrs.status`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// String value at `path`; `None` for absent or non-string values.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    pub fn bool_at(&self, path: &str) -> Option<bool> {
        self.get_path(path).and_then(Value::as_bool)
    }

    pub fn list_at(&self, path: &str) -> Option<&Vec<Value>> {
        self.get_path(path).and_then(Value::as_array)
    }

    pub fn object_at(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get_path(path).and_then(Value::as_object)
    }

    /// Whether `path` holds a usable value. Null and blank strings count as absent.
    pub fn has(&self, path: &str) -> bool {
        match self.get_path(path) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }
}

/// Result of splitting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub record: Result<Record, FrontMatterError>,
    pub body: String,
}

impl FrontMatter {
    /// A document whose file could not be read at all.
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            record: Err(FrontMatterError::Unreadable(reason.into())),
            body: String::new(),
        }
    }
}

/// Extract the front-matter record and body from raw file text.
///
/// Text that does not open with a `---` line yields an empty record and the
/// full text as body.
pub fn extract(text: &str) -> FrontMatter {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return plain(text);
    };
    if first.trim_end() != DELIMITER {
        return plain(text);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return FrontMatter {
                record: parse_block(yaml),
                body: body.to_string(),
            };
        }
        offset += line.len();
    }

    FrontMatter {
        record: Err(FrontMatterError::Unterminated),
        body: text.to_string(),
    }
}

fn plain(text: &str) -> FrontMatter {
    FrontMatter {
        record: Ok(Record::default()),
        body: text.to_string(),
    }
}

fn parse_block(yaml: &str) -> Result<Record, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(Record::default());
    }

    let value: YamlValue =
        serde_yaml::from_str(yaml).map_err(|e| FrontMatterError::Yaml(e.to_string()))?;

    match value {
        YamlValue::Null => Ok(Record::default()),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(key_text(&key), yaml_to_json(value));
            }
            Ok(Record(map))
        }
        other => Err(FrontMatterError::NotAMapping(yaml_kind(&other))),
    }
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a list",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}

fn key_text(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn yaml_to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or_else(|| Value::String(n.to_string()), Value::Number)
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(key_text(&key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}
