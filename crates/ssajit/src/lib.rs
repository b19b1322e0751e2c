/*! Lower a typed SSA IR to native code.
 *
 * Single import for the whole pipeline: build or parse a `CompiledIR`,
 * compile it through Cranelift, and call the result directly.
 */

pub use ssajit_core as core;
pub use ssajit_emit as emit;
pub use ssajit_parser as parser;

pub use ssajit_core::{
    compile, compile_with, CodegenConfig, CompileError, CompiledFunction, CompiledIR, IrBuilder,
    NativeFunction, Operand, Operator, ScalarType, Statement,
};

pub use ssajit_emit::IrEmitter;

pub use ssajit_parser::{parse_ir, ParseError};
