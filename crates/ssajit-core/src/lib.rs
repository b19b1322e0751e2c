/*! Typed SSA IR and its lowering to native code.
 *
 * A front-end hands over a type-inferred, straight-line function body. This
 * crate checks it against a closed set of statement and operand shapes,
 * lowers it to Cranelift, and exposes the finalized code as a function that
 * can be called directly with native scalars.
 */

pub mod builder;
pub mod codegen;
pub mod config;
pub mod invoke;
pub mod ir;
pub mod ir_persist;
pub mod types;
pub mod values;

pub use builder::IrBuilder;
pub use codegen::{compile, compile_with, ModuleBuilder};
pub use config::{CodegenConfig, OptLevel};
pub use invoke::{CompiledFunction, InlineHint, NativeFunction, NativeScalar, NativeSignature};
pub use ir::{CompiledIR, Operand, Operator, Statement};
pub use types::{ScalarType, TypeMapper};
pub use values::ValueTable;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),
    #[error("Malformed IR: {0}")]
    MalformedIR(String),
    #[error("Use before definition: statement {statement} references v{referenced}")]
    UseBeforeDef { statement: usize, referenced: u32 },
    #[error("Signature mismatch: {0}")]
    SignatureMismatch(String),
    #[error("Cranelift error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests;
