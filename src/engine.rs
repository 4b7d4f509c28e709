//! Decoding and relationship resolution.
//!
//! A [`Resolver`] lives for one `resolve()` call. It fetches records from a
//! document, then walks every declared relationship of every record depth
//! first, handing each relationship field a batch of [`Request`]s through its
//! [`Slot`](crate::shape::Slot). Parsed documents are memoized for the length of
//! the call only.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{Document, DocumentHasher, DocumentId};
use crate::error::{ConfigurationError, DocjoinError, Result};
use crate::filter::{Filter, build_expression};
use crate::query::{Expression, Fragment, Query};
use crate::registry::{Declaration, JoinKeys, Registry, Relationship};
use crate::scalar::{Operator, Scalar};
use crate::settings::Settings;
use crate::shape::{Access, Cardinality, Descriptor, Field, Shape, Target};

// ------------- Request -------------
/// One nested fetch: a document, the filters selecting from it and the
/// declarations to resolve on whatever it yields.
#[derive(Debug, Clone)]
pub struct Request {
    document: Document,
    filters: Vec<Filter>,
    declarations: Vec<Declaration>,
    cardinality: Option<Cardinality>,
}

impl Request {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            filters: Vec::new(),
            declarations: Vec::new(),
            cardinality: None,
        }
    }
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
    pub fn declarations(mut self, declarations: Vec<Declaration>) -> Self {
        self.declarations = declarations;
        self
    }
    /// Overrides the cardinality otherwise taken from the receiving container.
    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }
    pub fn document(&self) -> &Document {
        &self.document
    }
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }
}

// ------------- Resolver -------------
pub struct Resolver<'q> {
    query: &'q dyn Query,
    max_depth: usize,
    parsed: HashMap<DocumentId, Arc<Value>, DocumentHasher>,
    // (document, expression) pairs currently being resolved, outermost first
    active: Vec<(DocumentId, String)>,
}

impl<'q> Resolver<'q> {
    pub fn new(query: &'q dyn Query, settings: &Settings) -> Self {
        Self {
            query,
            max_depth: settings.max_depth(),
            parsed: HashMap::default(),
            active: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Runs `requests` in order and concatenates what they yield.
    pub(crate) fn load<T: Target>(&mut self, requests: Vec<Request>) -> Result<Vec<T::Item>> {
        let mut items = Vec::new();
        for request in requests {
            let Request {
                document,
                filters,
                declarations,
                cardinality,
            } = request;
            let registry = Registry::<T::Item>::from_declarations(declarations)?;
            let cardinality = cardinality.unwrap_or_else(T::cardinality);
            items.extend(self.fetch(&document, &filters, &registry, cardinality)?);
        }
        Ok(items)
    }

    /// Selects records from `document`, decodes them and resolves every
    /// relationship in `registry` on each of them.
    pub(crate) fn fetch<S: Shape>(
        &mut self,
        document: &Document,
        filters: &[Filter],
        registry: &Registry<S>,
        cardinality: Cardinality,
    ) -> Result<Vec<S>> {
        if let Some(orphan) = registry.orphans().next() {
            warn!(shape = S::NAME, path = orphan.path(), "nested declaration without parent");
            return Err(ConfigurationError::OrphanNestedDeclaration {
                shape: S::NAME,
                path: orphan.path().to_string(),
            }
            .into());
        }
        let expression = build_expression(filters, registry.descriptor(), cardinality)?;
        let frame = (document.id(), expression.as_str().to_string());
        if self.active.contains(&frame) {
            return Err(DocjoinError::CyclicRelationship {
                document: document.id(),
                expression: frame.1,
            });
        }
        if self.active.len() >= self.max_depth {
            return Err(DocjoinError::DepthExceeded(self.max_depth));
        }
        self.active.push(frame);
        let outcome = self.fetch_active(document, &expression, registry, cardinality);
        self.active.pop();
        outcome
    }

    fn fetch_active<S: Shape>(
        &mut self,
        document: &Document,
        expression: &Expression,
        registry: &Registry<S>,
        cardinality: Cardinality,
    ) -> Result<Vec<S>> {
        let value = self.parse(document)?;
        let fragment = self.query.query(&value, expression)?;
        let mut records = decode::<S>(fragment, cardinality)?;
        debug!(
            shape = S::NAME,
            document = %document.id(),
            %expression,
            depth = self.active.len(),
            records = records.len(),
            "decoded"
        );
        for record in records.iter_mut() {
            for relationship in registry.relationships() {
                self.attach(record, registry, relationship)?;
            }
        }
        Ok(records)
    }

    fn parse(&mut self, document: &Document) -> Result<Arc<Value>> {
        if let Some(value) = self.parsed.get(&document.id()) {
            return Ok(Arc::clone(value));
        }
        let value: Value = serde_json::from_slice(document.bytes())
            .map_err(|e| DocjoinError::decode(format!("document {}", document.id()), e))?;
        let value = Arc::new(value);
        self.parsed.insert(document.id(), Arc::clone(&value));
        Ok(value)
    }

    /// Resolves one relationship of one record and writes the result into it.
    fn attach<S: Shape>(
        &mut self,
        record: &mut S,
        registry: &Registry<S>,
        relationship: &Relationship,
    ) -> Result<()> {
        let descriptor = registry.descriptor();
        let local = lookup(descriptor, relationship.local_key()).ok_or_else(|| {
            DocjoinError::UnknownField {
                shape: S::NAME,
                field: relationship.local_key().to_string(),
            }
        })?;
        let key = match local.access() {
            Access::Value(get) => get(&*record),
            Access::Opaque | Access::Relation { .. } => {
                debug!(
                    shape = S::NAME,
                    field = relationship.field(),
                    key = local.name(),
                    "key has no scalar form, relationship left empty"
                );
                return Ok(());
            }
        };
        let slot = match descriptor.field(relationship.field()).map(Field::access) {
            Some(Access::Relation { slot, .. }) => *slot,
            _ => {
                return Err(ConfigurationError::MissingRelationshipMetadata {
                    shape: S::NAME,
                    field: relationship.field().to_string(),
                    reason: "field is not described as a relationship".to_string(),
                }
                .into());
            }
        };
        let nested = registry.nested(relationship.field());
        let requests = match relationship.join() {
            Some(join) => self.join_requests(relationship, join, &key, nested)?,
            None => vec![
                Request::new(relationship.source().clone())
                    .filter(Filter::equals(relationship.remote_key(), key))
                    .declarations(nested),
            ],
        };
        debug!(
            shape = S::NAME,
            field = relationship.field(),
            kind = %relationship.kind(),
            requests = requests.len(),
            "resolving relationship"
        );
        slot(record).load(self, requests)
    }

    /// One first-match request per join row linking `key` to a remote record.
    fn join_requests(
        &mut self,
        relationship: &Relationship,
        join: &JoinKeys,
        key: &Scalar,
        nested: Vec<Declaration>,
    ) -> Result<Vec<Request>> {
        let literal = key
            .literal()
            .ok_or_else(|| ConfigurationError::UnsupportedFilterValueType {
                field: relationship.local_key().to_string(),
                kind: key.data_type(),
            })?;
        let expression = Expression::predicate(join.local_column(), Operator::Eq, &literal, true);
        let rows = self.parse(join.document())?;
        let fragment = self.query.query(&rows, &expression)?;
        let mut requests = Vec::new();
        for row in fragment.into_values() {
            match row.get(join.remote_column()).and_then(Scalar::from_json) {
                Some(remote) => requests.push(
                    Request::new(relationship.source().clone())
                        .filter(Filter::equals(relationship.remote_key(), remote))
                        .declarations(nested.clone())
                        .cardinality(Cardinality::Single),
                ),
                None => warn!(
                    field = relationship.field(),
                    column = join.remote_column(),
                    join = %join.document().id(),
                    "join row without a scalar remote key, skipped"
                ),
            }
        }
        Ok(requests)
    }
}

// a key may be named by its semantic or its wire name
fn lookup<'d, S>(descriptor: &'d Descriptor<S>, name: &str) -> Option<&'d Field<S>> {
    descriptor.field(name).or_else(|| {
        descriptor
            .semantic_name(name)
            .and_then(|semantic| descriptor.field(semantic))
    })
}

fn decode<S: Shape>(fragment: Fragment, cardinality: Cardinality) -> Result<Vec<S>> {
    let values = match fragment {
        Fragment::Missing => return Ok(Vec::new()),
        // an unfiltered array document offers its elements, a single target takes the first
        Fragment::One(Value::Array(items)) => items,
        Fragment::One(value) => vec![value],
        Fragment::Many(values) => values,
    };
    let values = values.into_iter().filter(|value| !value.is_null());
    let values: Vec<Value> = match cardinality {
        Cardinality::Single => values.take(1).collect(),
        Cardinality::Collection => values.collect(),
    };
    values
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(|e| DocjoinError::decode(S::NAME, e)))
        .collect()
}
