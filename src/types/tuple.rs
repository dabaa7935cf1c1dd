//! Tuples and tuple descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::types::{DataType, Value};

/// Text used wherever a field or table name is absent.
pub const NULL_NAME: &str = "null";

/// Type and (optional) name of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDesc {
    /// Field data type.
    pub field_type: DataType,
    /// Field name, if the table declared one.
    pub field_name: Option<String>,
}

impl FieldDesc {
    /// Creates a named field.
    #[must_use]
    pub fn new(field_type: DataType, field_name: impl Into<String>) -> Self {
        FieldDesc {
            field_type,
            field_name: Some(field_name.into()),
        }
    }

    /// Creates a field without a name.
    #[must_use]
    pub fn unnamed(field_type: DataType) -> Self {
        FieldDesc {
            field_type,
            field_name: None,
        }
    }

    /// Returns the field name, or `"null"` when it is absent.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.field_name.as_deref().unwrap_or(NULL_NAME)
    }
}

impl fmt::Display for FieldDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.field_type, self.display_name())
    }
}

/// Ordered schema of a tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TupleDesc {
    fields: Vec<FieldDesc>,
}

impl TupleDesc {
    /// Creates a descriptor from field definitions.
    #[must_use]
    pub fn new(fields: Vec<FieldDesc>) -> Self {
        TupleDesc { fields }
    }

    /// Creates a descriptor from parallel type and name lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the two lists differ in length.
    pub fn from_parts(types: &[DataType], names: &[&str]) -> Result<Self> {
        if types.len() != names.len() {
            return Err(ScanError::SchemaMismatch(format!(
                "{} field types but {} field names",
                types.len(),
                names.len()
            )));
        }
        Ok(TupleDesc {
            fields: types
                .iter()
                .zip(names)
                .map(|(ty, name)| FieldDesc::new(*ty, *name))
                .collect(),
        })
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Returns the field definition at `index`.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&FieldDesc> {
        self.fields.get(index)
    }

    /// Returns the type of the field at `index`.
    #[must_use]
    pub fn field_type(&self, index: usize) -> Option<DataType> {
        self.fields.get(index).map(|f| f.field_type)
    }

    /// Returns the name of the field at `index`, if it has one.
    #[must_use]
    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|f| f.field_name.as_deref())
    }

    /// Finds the index of the first field with the given name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.field_name.as_deref() == Some(name))
    }

    /// Returns an iterator over the field definitions.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDesc> {
        self.fields.iter()
    }

    /// Returns a copy of this descriptor with every field name rewritten to
    /// `"{prefix}.{field}"`. Types and order are unchanged.
    #[must_use]
    pub fn qualified(&self, prefix: &str) -> TupleDesc {
        TupleDesc {
            fields: self
                .fields
                .iter()
                .map(|f| FieldDesc::new(f.field_type, format!("{prefix}.{}", f.display_name())))
                .collect(),
        }
    }

    /// Checks that `tuple` conforms to this descriptor.
    ///
    /// `Value::Null` is accepted for any field type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` on an arity difference and `TypeError` on a
    /// value of the wrong type.
    pub fn validate(&self, tuple: &Tuple) -> Result<()> {
        if tuple.len() != self.fields.len() {
            return Err(ScanError::SchemaMismatch(format!(
                "Expected {} fields, got {}",
                self.fields.len(),
                tuple.len()
            )));
        }
        for (field, value) in self.fields.iter().zip(tuple.iter()) {
            if let Some(actual) = value.data_type() {
                if actual != field.field_type {
                    return Err(ScanError::TypeError {
                        expected: field.field_type.name().into(),
                        actual: actual.name().into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Serializes the descriptor to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| ScanError::Database(format!("Failed to serialize tuple descriptor: {e}")))
    }

    /// Deserializes a descriptor from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| ScanError::Database(format!("Failed to deserialize tuple descriptor: {e}")))
    }
}

impl fmt::Display for TupleDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// A single stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    /// Creates a tuple from its field values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Tuple { values }
    }

    /// Returns the value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the tuple has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Consumes the tuple, returning its values.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Tuple::new(values)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}
