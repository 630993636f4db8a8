//! Serializable layout descriptions
//!
//! Two processes sharing a region must agree on every offset. A
//! [`LayoutSchema`] captures a struct's layout so it can be shipped alongside
//! the region (bincode-encoded), compared against a local type, or used to
//! rebuild that type on the other side.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};
use crate::layout::{define_struct, StructOptions, StructType};
use crate::types::{NumericKind, TypeDescriptor};

/// Layout of one struct type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSchema {
    pub name: String,
    pub size: usize,
    pub align: usize,
    pub fields: Vec<FieldSchema>,
}

/// Layout of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub offset: usize,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Numeric(NumericKind),
    Struct(LayoutSchema),
}

impl LayoutSchema {
    /// Describe `ty`
    pub fn of(ty: &StructType) -> Self {
        let fields = ty
            .fields()
            .iter()
            .filter_map(|field| {
                let kind = match field.ty() {
                    TypeDescriptor::Numeric(kind) => FieldKind::Numeric(*kind),
                    TypeDescriptor::Struct(inner) => FieldKind::Struct(LayoutSchema::of(inner)),
                    // Rejected at declaration time; never present in a built type.
                    TypeDescriptor::Opaque(_) => return None,
                };
                Some(FieldSchema {
                    name: field.name().to_string(),
                    offset: field.offset(),
                    kind,
                })
            })
            .collect();

        Self {
            name: ty.name().to_string(),
            size: ty.size(),
            align: ty.align(),
            fields,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Every numeric leaf as `(dotted path, absolute offset, kind)`
    pub fn leaves(&self) -> Vec<(String, usize, NumericKind)> {
        let mut out = Vec::new();
        self.collect_leaves("", 0, &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &str, base: usize, out: &mut Vec<(String, usize, NumericKind)>) {
        for field in &self.fields {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", prefix, field.name)
            };
            match &field.kind {
                FieldKind::Numeric(kind) => out.push((path, base + field.offset, *kind)),
                FieldKind::Struct(inner) => inner.collect_leaves(&path, base + field.offset, out),
            }
        }
    }

    /// Same size and alignment, and every leaf path both sides share sits
    /// at the same offset with the same kind
    pub fn is_compatible_with(&self, other: &LayoutSchema) -> bool {
        if self.size != other.size || self.align != other.align {
            return false;
        }
        let theirs = other.leaves();
        self.leaves().iter().all(|(path, offset, kind)| {
            theirs
                .iter()
                .find(|(other_path, _, _)| other_path == path)
                .map_or(true, |(_, other_offset, other_kind)| {
                    other_offset == offset && other_kind == kind
                })
        })
    }

    /// Rebuild a local type from this schema, verifying the offsets agree
    pub fn define(&self) -> Result<TypeDescriptor> {
        let mut declared = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let ty = match &field.kind {
                FieldKind::Numeric(kind) => TypeDescriptor::Numeric(*kind),
                FieldKind::Struct(inner) => inner.define()?,
            };
            declared.push((field.name.clone(), ty));
        }

        let ty = define_struct(declared, StructOptions::transparent().with_name(self.name.clone()))?;
        let rebuilt = ty
            .as_struct()
            .map(|st| LayoutSchema::of(st))
            .ok_or_else(|| ViewError::serialization("schema did not produce a struct"))?;

        if rebuilt != *self {
            return Err(ViewError::invalid_parameter(
                "schema",
                format!(
                    "layout of '{}' does not match the local layout rule (size {} vs {})",
                    self.name, self.size, rebuilt.size
                ),
            ));
        }
        Ok(ty)
    }
}

impl StructType {
    /// Serializable description of this type's layout
    pub fn schema(&self) -> LayoutSchema {
        LayoutSchema::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FLOAT64, INT16, INT32, UINT8};

    fn rect() -> TypeDescriptor {
        let point = define_struct(
            [("x", INT32), ("y", INT32)],
            StructOptions::transparent().with_name("Point"),
        )
        .unwrap();
        define_struct(
            [("ul", point.clone()), ("lr", point)],
            StructOptions::transparent().with_name("Rect"),
        )
        .unwrap()
    }

    #[test]
    fn test_schema_describes_layout() {
        let schema = rect().as_struct().unwrap().schema();
        assert_eq!(schema.name, "Rect");
        assert_eq!(schema.size, 16);
        assert_eq!(schema.align, 4);
        assert_eq!(
            schema.leaves(),
            vec![
                ("ul.x".to_string(), 0, NumericKind::Int32),
                ("ul.y".to_string(), 4, NumericKind::Int32),
                ("lr.x".to_string(), 8, NumericKind::Int32),
                ("lr.y".to_string(), 12, NumericKind::Int32),
            ]
        );
    }

    #[test]
    fn test_schema_bincode_and_rebuild() {
        let schema = rect().as_struct().unwrap().schema();
        let bytes = schema.to_bytes().unwrap();
        let decoded = LayoutSchema::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, schema);

        let rebuilt = decoded.define().unwrap();
        assert_eq!(rebuilt.size(), 16);
        assert!(rebuilt.as_struct().unwrap().schema().is_compatible_with(&schema));
    }

    #[test]
    fn test_rebuild_rejects_foreign_layout() {
        let mut schema = define_struct([("a", UINT8), ("b", FLOAT64)], StructOptions::transparent())
            .unwrap()
            .as_struct()
            .unwrap()
            .schema();
        // A packed peer placed `b` right after `a`.
        schema.fields[1].offset = 1;
        schema.size = 9;
        schema.align = 1;
        assert!(schema.define().is_err());
    }

    #[test]
    fn test_compatibility() {
        let a = define_struct([("x", INT32), ("y", INT16)], StructOptions::transparent()).unwrap();
        let b = define_struct([("x", INT32), ("z", INT16)], StructOptions::transparent()).unwrap();
        let c = define_struct([("y", INT16), ("x", INT32)], StructOptions::transparent()).unwrap();
        let a = a.as_struct().unwrap().schema();
        let b = b.as_struct().unwrap().schema();
        let c = c.as_struct().unwrap().schema();
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
        assert!(LayoutSchema::from_bytes(&[1, 2, 3]).is_err());
    }
}
