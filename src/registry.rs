//! Relationship declarations and the per-shape registry that validates them.
//!
//! A declaration names a relationship field by path. A direct path (`"Orders"`)
//! is bound immediately against the shape's descriptor, so missing or malformed
//! key metadata is reported when the relationship is declared rather than when
//! it is resolved. A dotted path (`"Orders.Product"`) belongs to the records the
//! first segment resolves to; it is kept aside untouched and handed down when
//! that relationship is resolved.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::Document;
use crate::error::{ConfigurationError, DocjoinError, Result};
use crate::shape::{Access, Descriptor, Shape};

lazy_static! {
    static ref KEY_SEPARATOR: Regex = Regex::new(r"\s*,\s*").expect("key separator compiles");
}

pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// This record references one record elsewhere by foreign key.
    SingleParent,
    /// This record is referenced by zero or more records elsewhere.
    OneToMany,
    /// Association through a join document.
    ManyToMany,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            RelationKind::SingleParent => "single-parent",
            RelationKind::OneToMany => "one-to-many",
            RelationKind::ManyToMany => "many-to-many",
        };
        f.write_str(kind)
    }
}

// ------------- Declaration -------------
#[derive(Debug, Clone)]
pub struct Declaration {
    path: String,
    source: Document,
    join: Option<Document>,
}

impl Declaration {
    pub fn new(path: impl Into<String>, source: Document) -> Self {
        Self {
            path: path.into(),
            source,
            join: None,
        }
    }
    pub fn through(path: impl Into<String>, source: Document, join: Document) -> Self {
        Self {
            path: path.into(),
            source,
            join: Some(join),
        }
    }
    pub fn path(&self) -> &str {
        &self.path
    }
    pub fn source(&self) -> &Document {
        &self.source
    }
    pub fn join(&self) -> Option<&Document> {
        self.join.as_ref()
    }
    pub fn is_nested(&self) -> bool {
        self.path.contains(PATH_SEPARATOR)
    }
    /// The first path segment, i.e. the relationship this declaration hangs off.
    pub fn head(&self) -> &str {
        match self.path.split_once(PATH_SEPARATOR) {
            Some((head, _)) => head,
            None => &self.path,
        }
    }
    /// The same declaration relative to `field`, if it lies beneath it.
    pub fn beneath(&self, field: &str) -> Option<Declaration> {
        let rest = self.path.strip_prefix(field)?.strip_prefix(PATH_SEPARATOR)?;
        if rest.is_empty() {
            return None;
        }
        Some(Self {
            path: rest.to_string(),
            source: self.source.clone(),
            join: self.join.clone(),
        })
    }
}

// ------------- Relationship -------------
/// Wire names of the two columns of a join document.
#[derive(Debug, Clone)]
pub struct JoinKeys {
    document: Document,
    local_column: String,
    remote_column: String,
}

impl JoinKeys {
    pub fn document(&self) -> &Document {
        &self.document
    }
    pub fn local_column(&self) -> &str {
        &self.local_column
    }
    pub fn remote_column(&self) -> &str {
        &self.remote_column
    }
}

/// A declaration bound against its shape.
#[derive(Debug, Clone)]
pub struct Relationship {
    field: &'static str,
    kind: RelationKind,
    local_key: String,
    remote_key: String,
    source: Document,
    join: Option<JoinKeys>,
}

impl Relationship {
    pub fn field(&self) -> &'static str {
        self.field
    }
    pub fn kind(&self) -> RelationKind {
        self.kind
    }
    pub fn local_key(&self) -> &str {
        &self.local_key
    }
    pub fn remote_key(&self) -> &str {
        &self.remote_key
    }
    pub fn source(&self) -> &Document {
        &self.source
    }
    pub fn join(&self) -> Option<&JoinKeys> {
        self.join.as_ref()
    }
}

fn key_names(keys: &str) -> Vec<String> {
    let keys = keys.trim();
    if keys.is_empty() {
        return Vec::new();
    }
    KEY_SEPARATOR.split(keys).map(str::to_string).collect()
}

// ------------- Registry -------------
pub struct Registry<S> {
    descriptor: Descriptor<S>,
    relationships: Vec<Relationship>,
    deferred: Vec<Declaration>,
}

impl<S: Shape> Registry<S> {
    pub fn new() -> Self {
        Self {
            descriptor: Descriptor::of(),
            relationships: Vec::new(),
            deferred: Vec::new(),
        }
    }

    pub fn from_declarations(declarations: impl IntoIterator<Item = Declaration>) -> Result<Self> {
        let mut registry = Self::new();
        for declaration in declarations {
            registry.declare(declaration)?;
        }
        Ok(registry)
    }

    /// Declares a relationship, returning whether an earlier declaration of the
    /// same path was replaced.
    pub fn declare(&mut self, declaration: Declaration) -> Result<bool> {
        if declaration.is_nested() {
            return Ok(self.keep_deferred(declaration));
        }
        let relationship = self.bind(declaration)?;
        Ok(self.keep(relationship))
    }

    fn keep(&mut self, relationship: Relationship) -> bool {
        match self
            .relationships
            .iter_mut()
            .find(|kept| kept.field == relationship.field)
        {
            Some(kept) => {
                *kept = relationship;
                true
            }
            None => {
                self.relationships.push(relationship);
                false
            }
        }
    }

    fn keep_deferred(&mut self, declaration: Declaration) -> bool {
        match self
            .deferred
            .iter_mut()
            .find(|kept| kept.path == declaration.path)
        {
            Some(kept) => {
                *kept = declaration;
                true
            }
            None => {
                self.deferred.push(declaration);
                false
            }
        }
    }

    fn bind(&self, declaration: Declaration) -> Result<Relationship> {
        let shape = self.descriptor.name();
        let field = self
            .descriptor
            .field(declaration.path())
            .ok_or_else(|| DocjoinError::UnknownField {
                shape,
                field: declaration.path().to_string(),
            })?;
        let (kind, keys) = match field.access() {
            Access::Relation { kind, keys, .. } => (*kind, *keys),
            Access::Value(_) | Access::Opaque => {
                return Err(ConfigurationError::MissingRelationshipMetadata {
                    shape,
                    field: field.name().to_string(),
                    reason: "field is not described as a relationship".to_string(),
                }
                .into());
            }
        };
        let names = key_names(keys);
        let Declaration { source, join, .. } = declaration;
        match kind {
            RelationKind::ManyToMany => {
                let found = names.iter().filter(|name| !name.is_empty()).count();
                let [local_key, local_column, remote_key, remote_column]: [String; 4] =
                    match names.try_into() {
                        Ok(names) if found == 4 => names,
                        _ => {
                            return Err(ConfigurationError::MalformedManyToManyMetadata {
                                shape,
                                field: field.name().to_string(),
                                found,
                            }
                            .into());
                        }
                    };
                let document = join.ok_or_else(|| ConfigurationError::MissingJoinDocument {
                    shape,
                    field: field.name().to_string(),
                })?;
                Ok(Relationship {
                    field: field.name(),
                    kind,
                    local_key,
                    remote_key,
                    source,
                    join: Some(JoinKeys {
                        document,
                        local_column,
                        remote_column,
                    }),
                })
            }
            RelationKind::SingleParent | RelationKind::OneToMany => {
                let found = names.iter().filter(|name| !name.is_empty()).count();
                let [local_key, remote_key]: [String; 2] = match names.try_into() {
                    Ok(names) if found == 2 => names,
                    _ => {
                        return Err(ConfigurationError::MissingRelationshipMetadata {
                            shape,
                            field: field.name().to_string(),
                            reason: format!("expected two key names in \"{}\"", keys),
                        }
                        .into());
                    }
                };
                if join.is_some() {
                    return Err(ConfigurationError::UnexpectedJoinDocument {
                        shape,
                        field: field.name().to_string(),
                    }
                    .into());
                }
                Ok(Relationship {
                    field: field.name(),
                    kind,
                    local_key,
                    remote_key,
                    source,
                    join: None,
                })
            }
        }
    }

    pub fn descriptor(&self) -> &Descriptor<S> {
        &self.descriptor
    }
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }
    pub fn relationship(&self, field: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|kept| kept.field == field)
    }
    pub fn deferred(&self) -> &[Declaration] {
        &self.deferred
    }
    /// Deferred declarations beneath `field`, made relative to it.
    pub fn nested(&self, field: &str) -> Vec<Declaration> {
        self.deferred
            .iter()
            .filter_map(|declaration| declaration.beneath(field))
            .collect()
    }
    /// Deferred declarations whose first segment was never declared directly.
    pub fn orphans(&self) -> impl Iterator<Item = &Declaration> {
        self.deferred
            .iter()
            .filter(|declaration| self.relationship(declaration.head()).is_none())
    }
    pub fn len(&self) -> usize {
        self.relationships.len() + self.deferred.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Shape> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}
