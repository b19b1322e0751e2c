/*! The post-inference IR accepted by the lowering engine.
 *
 * Statements, operands and operators are closed sum types. A front-end that
 * holds anything outside these shapes has to reject it while converting into
 * this model, so the engine can match exhaustively.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ScalarType, TypeMapper};
use crate::{CompileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// The k-th function parameter.
    Param(u32),
    /// The value defined by the statement at this index.
    Ssa(u32),
    ConstInt { value: i64, width: u16 },
}

impl Operand {
    pub fn const_i64(value: i64) -> Self {
        Operand::ConstInt { value, width: 64 }
    }

    pub fn as_ssa(&self) -> Option<u32> {
        match self {
            Operand::Ssa(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Param(k) => write!(f, "p{}", k),
            Operand::Ssa(id) => write!(f, "v{}", id),
            Operand::ConstInt { value, width } => write!(f, "{}:i{}", value, width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Operator {
    Add,
    Mul,
}

impl Operator {
    /// Resolves an intrinsic name. Names outside the supported set are
    /// rejected here, at the boundary into the closed IR.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "add" | "add_int" => Ok(Operator::Add),
            "mul" | "mul_int" => Ok(Operator::Mul),
            other => Err(CompileError::UnsupportedConstruct(format!(
                "operator `{}`",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Mul => "mul",
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = CompileError;

    fn try_from(name: String) -> Result<Self> {
        Operator::from_name(&name)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    Call { op: Operator, operands: Vec<Operand> },
    Return(Operand),
}

/// A type-inferred function body ready for lowering.
///
/// The SSA id of a statement is its index in `statements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledIR {
    #[serde(default = "default_name")]
    pub name: String,
    pub params: Vec<ScalarType>,
    pub result: ScalarType,
    pub statements: Vec<Statement>,
}

fn default_name() -> String {
    "anon".to_string()
}

impl CompiledIR {
    pub fn new(params: Vec<ScalarType>, result: ScalarType, statements: Vec<Statement>) -> Self {
        Self {
            name: default_name(),
            params,
            result,
            statements,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Checks every structural and type invariant without touching the
    /// backend. Reports the first violation in the order lowering would.
    pub fn validate(&self) -> Result<()> {
        let types = TypeMapper::new();
        for tag in self.params.iter().chain(std::iter::once(&self.result)) {
            types.resolve(*tag)?;
        }

        let last = self.statements.len().saturating_sub(1);
        for (index, stmt) in self.statements.iter().enumerate() {
            match stmt {
                Statement::Call { op, operands } => {
                    check_arity(*op, operands)?;
                    for operand in operands {
                        self.check_operand(index, operand, &types)?;
                    }
                }
                Statement::Return(operand) => {
                    check_return_position(index, last)?;
                    let id = return_ssa(operand)?;
                    check_defined(index, id)?;
                    return Ok(());
                }
            }
        }

        Err(CompileError::MalformedIR("missing return".to_string()))
    }

    fn check_operand(&self, index: usize, operand: &Operand, types: &TypeMapper) -> Result<()> {
        match operand {
            Operand::Param(k) => check_param(*k, self.params.len()),
            Operand::Ssa(id) => check_defined(index, *id),
            Operand::ConstInt { width, .. } => types.resolve_int_width(*width).map(|_| ()),
        }
    }
}

pub(crate) fn check_arity(op: Operator, operands: &[Operand]) -> Result<()> {
    if operands.len() != 2 {
        return Err(CompileError::UnsupportedConstruct(format!(
            "`{}` with {} operands",
            op,
            operands.len()
        )));
    }
    Ok(())
}

pub(crate) fn check_param(k: u32, count: usize) -> Result<()> {
    if k as usize >= count {
        return Err(CompileError::MalformedIR(format!(
            "parameter p{} out of range ({} parameters)",
            k, count
        )));
    }
    Ok(())
}

pub(crate) fn check_defined(index: usize, id: u32) -> Result<()> {
    if id as usize >= index {
        return Err(CompileError::UseBeforeDef {
            statement: index,
            referenced: id,
        });
    }
    Ok(())
}

pub(crate) fn check_return_position(index: usize, last: usize) -> Result<()> {
    if index != last {
        return Err(CompileError::MalformedIR(format!(
            "return at statement {} is followed by {} more",
            index,
            last - index
        )));
    }
    Ok(())
}

pub(crate) fn return_ssa(operand: &Operand) -> Result<u32> {
    operand.as_ssa().ok_or_else(|| {
        CompileError::MalformedIR(format!("return operand `{}` is not an SSA value", operand))
    })
}
