use cranelift_codegen::ir::{self as clif_ir, InstBuilder};
use cranelift_frontend::FunctionBuilder;
use tracing::trace;

use crate::{
    ir::{
        check_arity, check_defined, check_param, check_return_position, return_ssa, Operand,
        Operator, Statement,
    },
    types::TypeMapper,
    values::ValueTable,
    CompileError, Result,
};

/// Emits backend instructions for a statement sequence at the builder's
/// current insertion point.
pub struct LoweringEngine<'a, 'f> {
    builder: &'a mut FunctionBuilder<'f>,
    types: &'a TypeMapper,
    params: Vec<clif_ir::Value>,
    values: ValueTable,
}

impl<'a, 'f> LoweringEngine<'a, 'f> {
    pub fn new(
        builder: &'a mut FunctionBuilder<'f>,
        types: &'a TypeMapper,
        params: Vec<clif_ir::Value>,
    ) -> Self {
        Self {
            builder,
            types,
            params,
            values: ValueTable::new(),
        }
    }

    /// Lowers every statement in order and stops at the final return.
    /// Returns the number of values defined.
    pub fn lower(mut self, statements: &[Statement]) -> Result<usize> {
        let last = statements.len().saturating_sub(1);

        for (index, stmt) in statements.iter().enumerate() {
            trace!(index, ?stmt, "lowering statement");
            match stmt {
                Statement::Call { op, operands } => self.lower_call(index, *op, operands)?,
                Statement::Return(operand) => {
                    check_return_position(index, last)?;
                    self.lower_return(index, operand)?;
                    return Ok(self.values.len());
                }
            }
        }

        Err(CompileError::MalformedIR("missing return".to_string()))
    }

    fn lower_call(&mut self, index: usize, op: Operator, operands: &[Operand]) -> Result<()> {
        check_arity(op, operands)?;
        let left = self.resolve(index, &operands[0])?;
        let right = self.resolve(index, &operands[1])?;

        let res = match op {
            Operator::Add => self.builder.ins().iadd(left, right),
            Operator::Mul => self.builder.ins().imul(left, right),
        };

        if !self.values.define(index, res) {
            return Err(CompileError::MalformedIR(format!(
                "statement {} defined out of order",
                index
            )));
        }
        Ok(())
    }

    fn lower_return(&mut self, index: usize, operand: &Operand) -> Result<()> {
        let id = return_ssa(operand)?;
        let value = self.lookup(index, id)?;
        self.builder.ins().return_(&[value]);
        Ok(())
    }

    fn resolve(&mut self, index: usize, operand: &Operand) -> Result<clif_ir::Value> {
        match operand {
            Operand::Param(k) => {
                check_param(*k, self.params.len())?;
                Ok(self.params[*k as usize])
            }
            Operand::Ssa(id) => self.lookup(index, *id),
            Operand::ConstInt { value, width } => {
                let ty = self.types.resolve_int_width(*width)?;
                Ok(self.builder.ins().iconst(ty, *value))
            }
        }
    }

    fn lookup(&self, index: usize, id: u32) -> Result<clif_ir::Value> {
        check_defined(index, id)?;
        self.values.get(id).ok_or(CompileError::UseBeforeDef {
            statement: index,
            referenced: id,
        })
    }
}
