//! Structural assignment compiled to a flat list of scalar writes
//!
//! A plan is built once per struct type. Nested structs are flattened into
//! their leaf numeric fields, each carrying its name path and its offset from
//! the start of the outermost struct, so running the plan is a single pass
//! with no recursion over types.

use log::trace;

use crate::error::{Result, ViewError};
use crate::layout::{Field, ScalarAccessor};
use crate::memory::WindowCache;
use crate::types::{Number, TypeDescriptor};

use super::update::{Update, UpdateValue};

/// One leaf numeric field reachable from the struct root
#[derive(Debug, Clone)]
pub struct AssignStep {
    path: Vec<String>,
    offset: usize,
    accessor: &'static ScalarAccessor,
}

impl AssignStep {
    /// Field names from the root to this leaf
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Byte offset from the start of the root struct
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn accessor(&self) -> &'static ScalarAccessor {
        self.accessor
    }
}

/// Compiled copy routine for one struct type
#[derive(Debug, Clone, Default)]
pub struct AssignPlan {
    steps: Vec<AssignStep>,
    /// Paths of every nested struct field, leaf-less ones included
    records: Vec<Vec<String>>,
}

impl AssignPlan {
    /// Flatten `fields`; nested struct fields reuse their type's plan
    pub fn compile(fields: &[Field]) -> Result<Self> {
        let mut steps = Vec::new();
        let mut records = Vec::new();
        for field in fields {
            match field.ty() {
                TypeDescriptor::Numeric(kind) => steps.push(AssignStep {
                    path: vec![field.name().to_string()],
                    offset: field.offset(),
                    accessor: ScalarAccessor::for_kind(*kind),
                }),
                TypeDescriptor::Struct(inner) => {
                    records.push(vec![field.name().to_string()]);
                    for path in &inner.assign_plan().records {
                        let mut nested = Vec::with_capacity(path.len() + 1);
                        nested.push(field.name().to_string());
                        nested.extend(path.iter().cloned());
                        records.push(nested);
                    }
                    for step in &inner.assign_plan().steps {
                        let mut path = Vec::with_capacity(step.path.len() + 1);
                        path.push(field.name().to_string());
                        path.extend(step.path.iter().cloned());
                        steps.push(AssignStep {
                            path,
                            offset: field.offset() + step.offset,
                            accessor: step.accessor,
                        });
                    }
                }
                TypeDescriptor::Opaque(kind) => {
                    return Err(ViewError::unsupported(format!(
                        "structural assignment across {} field '{}'",
                        kind.name(),
                        field.name()
                    )))
                }
            }
        }
        Ok(Self { steps, records })
    }

    pub fn steps(&self) -> &[AssignStep] {
        &self.steps
    }

    /// Copy every field present in `source` into memory at `base_offset`.
    ///
    /// The whole source is checked against the type before any byte is
    /// written, so a mismatched source leaves memory untouched.
    pub fn apply(&self, mem: &WindowCache, base_offset: usize, source: &Update) -> Result<usize> {
        for path in &self.records {
            Self::walk(path, source)?;
        }

        let mut writes = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            if let Some(value) = Self::resolve(&step.path, source)? {
                writes.push((step, value));
            }
        }

        for (step, value) in &writes {
            trace!("assign {} @ {} <- {:?}", step.path.join("."), base_offset + step.offset, value);
            step.accessor.write(mem, base_offset + step.offset, *value);
        }
        Ok(writes.len())
    }

    /// Follow `path` through nested records; absent anywhere means "skip"
    fn walk<'u>(path: &[String], source: &'u Update) -> Result<Option<&'u Update>> {
        let mut current = source;
        for (depth, name) in path.iter().enumerate() {
            match current.get(name) {
                None => return Ok(None),
                Some(UpdateValue::Record(inner)) => current = inner,
                Some(other) => {
                    return Err(ViewError::type_mismatch(
                        path[..=depth].join("."),
                        "record",
                        other.describe(),
                    ))
                }
            }
        }
        Ok(Some(current))
    }

    fn resolve(path: &[String], source: &Update) -> Result<Option<Number>> {
        let (leaf, parents) = match path.split_last() {
            Some(split) => split,
            None => return Ok(None),
        };
        let current = match Self::walk(parents, source)? {
            Some(record) => record,
            None => return Ok(None),
        };

        match current.get(leaf) {
            None => Ok(None),
            Some(UpdateValue::Scalar(value)) => Ok(Some(*value)),
            Some(other) => Err(ViewError::type_mismatch(
                path.join("."),
                "number",
                other.describe(),
            )),
        }
    }
}
