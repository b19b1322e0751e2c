use crate::{
    ir::{CompiledIR, Operand, Operator, Statement},
    types::ScalarType,
};

pub struct IrBuilder {
    name: String,
    params: Vec<ScalarType>,
    result: ScalarType,
    statements: Vec<Statement>,
}

impl IrBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            result: ScalarType::I64,
            statements: Vec::new(),
        }
    }

    /// Declares the next parameter and returns the operand referring to it.
    pub fn param(&mut self, ty: ScalarType) -> Operand {
        self.params.push(ty);
        Operand::Param(self.params.len() as u32 - 1)
    }

    pub fn get_param(&self, index: usize) -> Operand {
        Operand::Param(index as u32)
    }

    pub fn returns(&mut self, ty: ScalarType) -> &mut Self {
        self.result = ty;
        self
    }

    pub fn const_int(&self, value: i64, width: u16) -> Operand {
        Operand::ConstInt { value, width }
    }

    pub fn call(&mut self, op: Operator, operands: Vec<Operand>) -> Operand {
        let id = self.statements.len() as u32;
        self.statements.push(Statement::Call { op, operands });
        Operand::Ssa(id)
    }

    pub fn add(&mut self, left: Operand, right: Operand) -> Operand {
        self.call(Operator::Add, vec![left, right])
    }

    pub fn mul(&mut self, left: Operand, right: Operand) -> Operand {
        self.call(Operator::Mul, vec![left, right])
    }

    pub fn ret(&mut self, value: Operand) -> &mut Self {
        self.statements.push(Statement::Return(value));
        self
    }

    pub fn current_ir(&self) -> &[Statement] {
        &self.statements
    }

    /// Finishes the IR as written. Nothing is validated here.
    pub fn build(self) -> CompiledIR {
        CompiledIR {
            name: self.name,
            params: self.params,
            result: self.result,
            statements: self.statements,
        }
    }
}
