//! Filters and the expressions they compile to.

use tracing::trace;

use crate::error::{ConfigurationError, Result};
use crate::query::Expression;
use crate::scalar::{Operator, Scalar};
use crate::shape::{Cardinality, Descriptor};

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    operator: Operator,
    value: Scalar,
}

impl Filter {
    /// A caller filter. Only text, integer and boolean values are accepted.
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Scalar>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let field = field.into();
        let value = value.into();
        match value {
            Scalar::Text(_) | Scalar::Int(_) | Scalar::UInt(_) | Scalar::Bool(_) => Ok(Self {
                field,
                operator,
                value,
            }),
            Scalar::Float(_) | Scalar::Float32(_) => {
                Err(ConfigurationError::UnsupportedFilterValueType {
                    field,
                    kind: value.data_type(),
                })
            }
        }
    }
    /// An equality filter on a relationship key, any key type allowed.
    pub fn equals(field: impl Into<String>, value: Scalar) -> Self {
        Self {
            field: field.into(),
            operator: Operator::Eq,
            value,
        }
    }
    pub fn field(&self) -> &str {
        &self.field
    }
    pub fn operator(&self) -> Operator {
        self.operator
    }
    pub fn value(&self) -> &Scalar {
        &self.value
    }
}

/// Compiles filters into one chained expression over a document of `descriptor` records.
///
/// Every step but the last selects all matches so the next step can narrow
/// them; the last step selects all matches only for collection targets.
pub fn build_expression<S>(
    filters: &[Filter],
    descriptor: &Descriptor<S>,
    cardinality: Cardinality,
) -> Result<Expression> {
    let mut expression = Expression::default();
    let last = filters.len().saturating_sub(1);
    for (i, filter) in filters.iter().enumerate() {
        let wire = descriptor.resolve_wire(filter.field());
        let literal = filter.value.literal().ok_or_else(|| {
            ConfigurationError::UnsupportedFilterValueType {
                field: filter.field.clone(),
                kind: filter.value.data_type(),
            }
        })?;
        let all = i < last || cardinality == Cardinality::Collection;
        expression = expression.chain(Expression::predicate(wire, filter.operator, &literal, all));
    }
    trace!(shape = descriptor.name(), %expression, "filter expression");
    Ok(expression)
}
