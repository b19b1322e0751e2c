use serde::{Deserialize, Serialize};

use crate::invoke::InlineHint;

/// Backend settings for one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub opt_level: OptLevel,
    /// Run the Cranelift verifier on the built function before defining it.
    pub verify: bool,
    /// Keep the textual Cranelift IR on the compiled artifact.
    pub capture_clif: bool,
    /// Inlining mark recorded on the compiled artifact.
    pub inline: InlineHint,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            opt_level: OptLevel::Speed,
            verify: true,
            capture_clif: false,
            inline: InlineHint::Always,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptLevel {
    None,
    Speed,
    SpeedAndSize,
}

impl OptLevel {
    /// Value of Cranelift's `opt_level` flag.
    pub fn as_flag(&self) -> &'static str {
        match self {
            OptLevel::None => "none",
            OptLevel::Speed => "speed",
            OptLevel::SpeedAndSize => "speed_and_size",
        }
    }
}
