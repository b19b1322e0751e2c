/*! Lower the IR to native code through Cranelift.
 *
 * Each compilation gets its own JIT module, function and builder. The
 * lowering engine walks the statements in order, emitting one Cranelift
 * instruction per call, and the module builder turns the result into a
 * finalized entry point.
 */

pub mod context;
pub mod lowering;
pub mod module;

pub use context::CodegenContext;
pub use lowering::LoweringEngine;
pub use module::{compile, compile_with, ModuleBuilder};
