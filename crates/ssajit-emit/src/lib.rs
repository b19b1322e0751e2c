/*! Turn IR back into readable text.
 *
 * The emitted text is exactly what the parser reads, so a function printed
 * here can be edited, stored next to a test, and fed back in. Colors are
 * optional and only ever wrap tokens.
 */

pub mod config;
pub mod emitter;

pub use config::{EmitterConfig, IndentStyle};
pub use emitter::{emit_json, IrEmitter};
