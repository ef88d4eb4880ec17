//! Core types for langsheet.
//! The resource parser decodes into these; the indexer and language writer
//! flatten them into [`TranslationUnit`]s.

use std::{borrow::Borrow, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Suffix appended to the key of a string whose text is a CDATA section.
pub const CDATA_MARKER: &str = "!cdata";

/// The unique identifier of one translation unit.
///
/// Keys are never built from free text; use the derivation constructors so
/// that every language derives the same key for the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// `<name>` or `<name>!cdata`.
    pub fn scalar(name: &str, cdata: bool) -> Self {
        if cdata {
            Key(format!("{name}{CDATA_MARKER}"))
        } else {
            Key(name.to_string())
        }
    }

    /// `<name>#<quantity>`.
    pub fn plural(name: &str, quantity: &str) -> Self {
        Key(format!("{name}#{quantity}"))
    }

    /// `<name>[<index>]`, index counted over `<item>` elements only.
    pub fn array(name: &str, index: usize) -> Self {
        Key(format!("{name}[{index}]"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One `strings.xml` document: the ordered children of `<resources>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ResourceTree {
    pub nodes: Vec<ResourceNode>,
}

impl ResourceTree {
    pub fn new(nodes: Vec<ResourceNode>) -> Self {
        Self { nodes }
    }

    pub(crate) fn push(&mut self, node: ResourceNode) {
        self.nodes.push(node);
    }
}

/// A child of the `<resources>` root, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum ResourceNode {
    Scalar(Scalar),
    Plural(PluralGroup),
    Array(StringArray),
    /// Free text for translators; becomes a row in the default table only.
    Comment(String),
}

/// A `<string>` element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Scalar {
    pub name: String,

    /// Concatenated text content, `None` when the element had no child nodes.
    pub value: Option<String>,

    /// Whether the first child node is a CDATA section.
    #[serde(default)]
    pub cdata: bool,

    #[serde(default = "default_translatable")]
    pub translatable: bool,
}

fn default_translatable() -> bool {
    true
}

impl Scalar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            cdata: false,
            translatable: true,
        }
    }

    pub fn cdata(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            cdata: true,
            ..Self::new(name, value)
        }
    }

    pub fn untranslatable(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            translatable: false,
            ..Self::new(name, value)
        }
    }

    /// Derives the key; a string without any text has no determinable key.
    pub fn key(&self) -> Result<Key, Error> {
        if self.value.is_none() {
            return Err(Error::MissingText {
                name: self.name.clone(),
            });
        }
        Ok(Key::scalar(&self.name, self.cdata))
    }
}

/// A `<plurals>` element with its `<item quantity="...">` children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluralGroup {
    pub name: String,
    /// `(quantity, text)` in document order.
    pub items: Vec<(String, String)>,
}

impl PluralGroup {
    pub fn new<Q: Into<String>, T: Into<String>>(
        name: impl Into<String>,
        items: impl IntoIterator<Item = (Q, T)>,
    ) -> Self {
        Self {
            name: name.into(),
            items: items
                .into_iter()
                .map(|(q, t)| (q.into(), t.into()))
                .collect(),
        }
    }
}

/// A `<string-array>` element with its `<item>` children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StringArray {
    pub name: String,
    pub items: Vec<String>,
}

impl StringArray {
    pub fn new<T: Into<String>>(name: impl Into<String>, items: impl IntoIterator<Item = T>) -> Self {
        Self {
            name: name.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single keyed value extracted from a [`ResourceNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit<'a> {
    pub key: Key,
    pub value: &'a str,
}

impl ResourceNode {
    /// The name shared by every unit of this node, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            ResourceNode::Scalar(s) => Some(&s.name),
            ResourceNode::Plural(p) => Some(&p.name),
            ResourceNode::Array(a) => Some(&a.name),
            ResourceNode::Comment(_) => None,
        }
    }

    /// Flattens the node into keyed units, in document order.
    ///
    /// Non-translatable strings and comments yield nothing. The same
    /// derivation serves the default language and every other language.
    pub fn units(&self) -> Result<Vec<TranslationUnit<'_>>, Error> {
        match self {
            ResourceNode::Scalar(s) if !s.translatable => Ok(Vec::new()),
            ResourceNode::Scalar(s) => {
                let key = s.key()?;
                Ok(vec![TranslationUnit {
                    key,
                    value: s.value.as_deref().unwrap_or_default(),
                }])
            }
            ResourceNode::Plural(p) => Ok(p
                .items
                .iter()
                .map(|(quantity, text)| TranslationUnit {
                    key: Key::plural(&p.name, quantity),
                    value: text,
                })
                .collect()),
            ResourceNode::Array(a) => Ok(a
                .items
                .iter()
                .enumerate()
                .map(|(i, text)| TranslationUnit {
                    key: Key::array(&a.name, i),
                    value: text,
                })
                .collect()),
            ResourceNode::Comment(_) => Ok(Vec::new()),
        }
    }
}

/// Undoes the Android `\'` and `\"` escapes for display in the table.
pub(crate) fn unescape_android(value: &str) -> String {
    value.replace("\\'", "'").replace("\\\"", "\"")
}
