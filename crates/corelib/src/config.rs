//! Declarative config tree for car and track description files.
//!
//! Text format, one entry per line:
//!
//! ```text
//! # comment
//! texture = body00.png, body-misc00.png
//! [wheel.front]
//! mesh = wheel.obj
//! position = 1.2, -0.7, 0.3
//! ```
//!
//! Section headers open a (possibly nested, dot separated) child node; keys are
//! looked up relative to a node, also with dots.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::{CoreError, CoreResult, Vec3, Vec4};

/// Values that can be read out of a config entry.
pub trait ConfigValue: Sized {
    fn parse_value(raw: &str) -> Option<Self>;
}

impl ConfigValue for String {
    fn parse_value(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }
}

impl ConfigValue for f32 {
    fn parse_value(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ConfigValue for bool {
    fn parse_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" => Some(false),
            _ => None,
        }
    }
}

impl ConfigValue for Vec<String> {
    fn parse_value(raw: &str) -> Option<Self> {
        Some(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

fn parse_floats<const N: usize>(raw: &str) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = raw.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

impl ConfigValue for Vec3 {
    fn parse_value(raw: &str) -> Option<Self> {
        parse_floats::<3>(raw).map(Vec3::from_array)
    }
}

impl ConfigValue for Vec4 {
    fn parse_value(raw: &str) -> Option<Self> {
        parse_floats::<4>(raw).map(Vec4::from_array)
    }
}

/// A node of the parsed config: its own value plus named children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigTree {
    name: String,
    value: String,
    children: BTreeMap<String, ConfigTree>,
}

impl ConfigTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn parse(name: impl Into<String>, text: &str) -> CoreResult<Self> {
        let mut root = Self::new(name);
        let mut section: Vec<String> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let header = header.strip_suffix(']').ok_or_else(|| CoreError::Syntax {
                    line: line_no + 1,
                    message: format!("unterminated section header '{trimmed}'"),
                })?;
                section = header
                    .split('.')
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty())
                    .collect();
                root.entry(&section);
                continue;
            }

            let (key, value) = trimmed.split_once('=').ok_or_else(|| CoreError::Syntax {
                line: line_no + 1,
                message: format!("expected 'key = value', found '{trimmed}'"),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(CoreError::Syntax {
                    line: line_no + 1,
                    message: "empty key".to_owned(),
                });
            }

            let mut path = section.clone();
            path.extend(key.split('.').map(str::to_owned));
            root.entry(&path).value = value.trim().to_owned();
        }

        Ok(root)
    }

    fn entry(&mut self, path: &[String]) -> &mut ConfigTree {
        let mut node = self;
        for part in path {
            node = node
                .children
                .entry(part.clone())
                .or_insert_with(|| ConfigTree::new(part.clone()));
        }
        node
    }

    /// Insert or overwrite a value at a dotted key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let path: Vec<String> = key.split('.').map(str::to_owned).collect();
        self.entry(&path).value = value.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Child node at a dotted path.
    pub fn child(&self, key: &str) -> Option<&ConfigTree> {
        key.split('.')
            .try_fold(self, |node, part| node.children.get(part))
    }

    pub fn children(&self) -> impl Iterator<Item = &ConfigTree> {
        self.children.values()
    }

    pub fn get<T: ConfigValue>(&self, key: &str) -> Option<T> {
        self.child(key).and_then(|node| T::parse_value(&node.value))
    }

    /// Like [`ConfigTree::get`], but writes a line to `error` when the value is
    /// absent or malformed.
    pub fn get_or_report<T: ConfigValue>(&self, key: &str, error: &mut dyn Write) -> Option<T> {
        let Some(node) = self.child(key) else {
            let err = CoreError::Missing(self.qualified(key));
            log::warn!("{err}");
            let _ = writeln!(error, "{err}");
            return None;
        };

        let parsed = T::parse_value(&node.value);
        if parsed.is_none() {
            let err = CoreError::Malformed {
                key: self.qualified(key),
                value: node.value.clone(),
            };
            log::warn!("{err}");
            let _ = writeln!(error, "{err}");
        }
        parsed
    }

    fn qualified(&self, key: &str) -> String {
        if self.name.is_empty() {
            key.to_owned()
        } else {
            format!("{}.{}", self.name, key)
        }
    }
}
