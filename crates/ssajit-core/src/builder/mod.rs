/*! Fluent API for constructing IR programmatically.
 *
 * SSA ids are statement positions, so hand-numbering them is easy to get
 * wrong. The builder assigns them as calls are appended and hands back the
 * operand that refers to each result.
 */

pub mod ir_builder;

pub use ir_builder::IrBuilder;
