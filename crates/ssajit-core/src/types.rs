use cranelift::codegen::ir::types as clif_types;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CompileError, Result};

/// Scalar type tags a front-end may attach to parameters, results and
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ScalarType {
    /// The signed integer tag of the given bit width, if one exists.
    pub fn int_of_width(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(ScalarType::I8),
            16 => Some(ScalarType::I16),
            32 => Some(ScalarType::I32),
            64 => Some(ScalarType::I64),
            _ => None,
        }
    }

    pub fn bits(&self) -> u16 {
        match self {
            ScalarType::I8 => 8,
            ScalarType::I16 => 16,
            ScalarType::I32 | ScalarType::F32 => 32,
            ScalarType::I64 | ScalarType::F64 => 64,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, ScalarType::F32 | ScalarType::F64)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i8" => Some(ScalarType::I8),
            "i16" => Some(ScalarType::I16),
            "i32" => Some(ScalarType::I32),
            "i64" => Some(ScalarType::I64),
            "f32" => Some(ScalarType::F32),
            "f64" => Some(ScalarType::F64),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::I8 => write!(f, "i8"),
            ScalarType::I16 => write!(f, "i16"),
            ScalarType::I32 => write!(f, "i32"),
            ScalarType::I64 => write!(f, "i64"),
            ScalarType::F32 => write!(f, "f32"),
            ScalarType::F64 => write!(f, "f64"),
        }
    }
}

/// Registry from scalar tags to Cranelift primitive types.
///
/// Only `i64` is registered. Every other tag is rejected rather than widened
/// or narrowed; adding a tag here is the extension point for more types.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    bindings: IndexMap<ScalarType, clif_types::Type>,
}

impl TypeMapper {
    pub fn new() -> Self {
        let mut bindings = IndexMap::new();
        bindings.insert(ScalarType::I64, clif_types::I64);
        Self { bindings }
    }

    pub fn resolve(&self, tag: ScalarType) -> Result<clif_types::Type> {
        self.bindings
            .get(&tag)
            .copied()
            .ok_or_else(|| CompileError::UnsupportedType(tag.to_string()))
    }

    /// Resolves the backend type of an integer constant of `bits` width.
    pub fn resolve_int_width(&self, bits: u16) -> Result<clif_types::Type> {
        match ScalarType::int_of_width(bits) {
            Some(tag) => self.resolve(tag),
            None => Err(CompileError::UnsupportedType(format!("i{}", bits))),
        }
    }

    pub fn is_supported(&self, tag: ScalarType) -> bool {
        self.bindings.contains_key(&tag)
    }

    pub fn supported(&self) -> impl Iterator<Item = ScalarType> + '_ {
        self.bindings.keys().copied()
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}
