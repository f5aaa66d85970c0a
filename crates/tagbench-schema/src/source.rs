//! Schema sources
//!
//! The task-definition loader is external to the engine; it hands over a
//! [`SchemaDefinition`] (or anything implementing [`SchemaSource`]) which is
//! validated into a [`SchemaModel`].

use crate::error::SchemaParseError;
use crate::schema::SchemaModel;
use crate::tag_type::{ArgumentType, AttributeType, TagKind, TagType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Anything that can produce a validated schema
pub trait SchemaSource: Send + Sync + Debug {
    /// Produce the schema model
    ///
    /// # Errors
    /// Returns [`SchemaParseError`] if the source is missing or malformed
    fn load(&self) -> Result<SchemaModel, SchemaParseError>;

    /// Human-readable origin (file path, inline name)
    fn describe(&self) -> String;
}

/// Load a schema from any source, logging what was loaded
///
/// # Errors
/// Propagates the source's [`SchemaParseError`]
pub fn load_schema(source: &dyn SchemaSource) -> Result<SchemaModel, SchemaParseError> {
    let schema = source.load().map_err(|e| {
        tracing::warn!(source = %source.describe(), error = %e, "schema load failed");
        e
    })?;
    tracing::info!(
        task = schema.name(),
        extent_types = schema.extent_types().len(),
        link_types = schema.link_types().len(),
        "schema loaded from {}",
        source.describe()
    );
    Ok(schema)
}

/// Declarative task definition as handed over by an external loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Task name
    pub name: String,

    /// Tag types in declaration order
    #[serde(default)]
    pub tags: Vec<TagTypeDefinition>,
}

/// Declared shape of a tag type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindDefinition {
    /// Anchors text
    Extent,
    /// Links extent tags
    Link,
}

/// Declaration of one tag type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagTypeDefinition {
    /// Type name
    pub name: String,

    /// Id prefix; defaults to the first character of the name
    #[serde(default)]
    pub prefix: Option<String>,

    /// Extent or link
    pub kind: KindDefinition,

    /// Extent tags of this type may have zero spans
    #[serde(default)]
    pub non_consuming: bool,

    /// Attribute declarations
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,

    /// Argument slot names (link types only)
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Declaration of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,

    /// Default value, empty meaning none
    #[serde(default)]
    pub default: Option<String>,

    /// Allowed values, unconstrained if absent
    #[serde(default)]
    pub values: Option<Vec<String>>,

    /// Must be non-empty for a tag to be complete
    #[serde(default)]
    pub required: bool,
}

impl SchemaDefinition {
    /// Create empty definition
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Append a tag type declaration
    #[inline]
    #[must_use]
    pub fn tag(mut self, tag: TagTypeDefinition) -> Self {
        self.tags.push(tag);
        self
    }

    /// Parse a JSON definition
    ///
    /// # Errors
    /// Returns [`SchemaParseError::Json`] on malformed input
    pub fn from_json_str(s: &str) -> Result<Self, SchemaParseError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a YAML definition
    ///
    /// # Errors
    /// Returns [`SchemaParseError::Yaml`] on malformed input
    pub fn from_yaml_str(s: &str) -> Result<Self, SchemaParseError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate into an immutable schema model
    ///
    /// # Errors
    /// Returns [`SchemaParseError`] for empty names, duplicate types,
    /// prefixes, attributes or arguments, arguments on extent types,
    /// non-consuming link types, and defaults outside their value set
    pub fn build(&self) -> Result<SchemaModel, SchemaParseError> {
        if self.name.trim().is_empty() {
            return Err(SchemaParseError::EmptyName("task".to_string()));
        }

        let mut types: IndexMap<String, Arc<TagType>> = IndexMap::new();
        let mut prefixes: HashMap<String, String> = HashMap::new();

        for def in &self.tags {
            let tag_type = def.build()?;

            if types.contains_key(tag_type.name()) {
                return Err(SchemaParseError::DuplicateType(tag_type.name().to_string()));
            }
            if let Some(first) = prefixes.get(tag_type.prefix()) {
                return Err(SchemaParseError::DuplicatePrefix {
                    prefix: tag_type.prefix().to_string(),
                    first: first.clone(),
                    second: tag_type.name().to_string(),
                });
            }

            prefixes.insert(tag_type.prefix().to_string(), tag_type.name().to_string());
            types.insert(tag_type.name().to_string(), Arc::new(tag_type));
        }

        Ok(SchemaModel::new(self.name.clone(), types))
    }
}

impl SchemaSource for SchemaDefinition {
    fn load(&self) -> Result<SchemaModel, SchemaParseError> {
        self.build()
    }

    fn describe(&self) -> String {
        format!("inline definition '{}'", self.name)
    }
}

impl TagTypeDefinition {
    /// Declare an extent type
    #[inline]
    #[must_use]
    pub fn extent(name: impl Into<String>) -> Self {
        Self::with_kind(name, KindDefinition::Extent)
    }

    /// Declare a link type
    #[inline]
    #[must_use]
    pub fn link(name: impl Into<String>) -> Self {
        Self::with_kind(name, KindDefinition::Link)
    }

    fn with_kind(name: impl Into<String>, kind: KindDefinition) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            kind,
            non_consuming: false,
            attributes: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Set explicit id prefix
    #[inline]
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Permit zero spans
    #[inline]
    #[must_use]
    pub fn non_consuming(mut self) -> Self {
        self.non_consuming = true;
        self
    }

    /// Append an attribute declaration
    #[inline]
    #[must_use]
    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append an argument slot
    #[inline]
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>) -> Self {
        self.arguments.push(name.into());
        self
    }

    fn build(&self) -> Result<TagType, SchemaParseError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SchemaParseError::EmptyName("tag type".to_string()));
        }

        let prefix = match &self.prefix {
            Some(p) => p.trim().to_string(),
            None => name.chars().take(1).collect(),
        };
        if prefix.is_empty() {
            return Err(SchemaParseError::EmptyName(format!("id prefix of '{name}'")));
        }

        let kind = match (self.kind, self.non_consuming) {
            (KindDefinition::Extent, non_consuming) => TagKind::Extent { non_consuming },
            (KindDefinition::Link, false) => TagKind::Link,
            (KindDefinition::Link, true) => {
                return Err(SchemaParseError::NonConsumingLink(name.to_string()))
            }
        };
        if kind != TagKind::Link && !self.arguments.is_empty() {
            return Err(SchemaParseError::ArgumentsOnExtent(name.to_string()));
        }

        let mut attributes: Vec<AttributeType> = Vec::with_capacity(self.attributes.len());
        for att in &self.attributes {
            let att_name = att.name.trim();
            if att_name.is_empty() {
                return Err(SchemaParseError::EmptyName(format!("attribute of '{name}'")));
            }
            if attributes.iter().any(|a| a.name() == att_name) {
                return Err(SchemaParseError::DuplicateAttribute {
                    tag_type: name.to_string(),
                    name: att_name.to_string(),
                });
            }
            let built = AttributeType::new(
                att_name.to_string(),
                name.to_string(),
                att.default.clone(),
                att.values.clone(),
                att.required,
            );
            if let Some(default) = built.default_value() {
                if !built.allows(default) {
                    return Err(SchemaParseError::DefaultOutsideValueSet {
                        tag_type: name.to_string(),
                        attribute: att_name.to_string(),
                        default: default.to_string(),
                    });
                }
            }
            attributes.push(built);
        }

        let mut arguments: Vec<ArgumentType> = Vec::with_capacity(self.arguments.len());
        for arg in &self.arguments {
            let arg_name = arg.trim();
            if arg_name.is_empty() {
                return Err(SchemaParseError::EmptyName(format!("argument of '{name}'")));
            }
            if arguments.iter().any(|a| a.name() == arg_name) {
                return Err(SchemaParseError::DuplicateArgument {
                    tag_type: name.to_string(),
                    name: arg_name.to_string(),
                });
            }
            arguments.push(ArgumentType::new(arg_name.to_string(), name.to_string()));
        }

        Ok(TagType::new(name.to_string(), prefix, kind, attributes, arguments))
    }
}

impl AttributeDefinition {
    /// Declare an unconstrained, optional attribute without default
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            values: None,
            required: false,
        }
    }

    /// Set default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Constrain to a finite value set
    #[inline]
    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Mark as required for completeness
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Schema definition stored in a JSON or YAML file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    path: PathBuf,
}

impl SchemaFile {
    /// Reference a definition file; nothing is read until [`SchemaSource::load`]
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the definition file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for SchemaFile {
    fn load(&self) -> Result<SchemaModel, SchemaParseError> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let raw = std::fs::read_to_string(&self.path).map_err(|source| SchemaParseError::Io {
            path: self.path.clone(),
            source,
        })?;

        let definition = match ext.as_str() {
            "json" => SchemaDefinition::from_json_str(&raw)?,
            "yaml" | "yml" => SchemaDefinition::from_yaml_str(&raw)?,
            other => return Err(SchemaParseError::UnsupportedFormat(other.to_string())),
        };
        definition.build()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
