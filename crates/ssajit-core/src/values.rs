use cranelift_codegen::ir as clif_ir;

/// Backend values defined so far, indexed by SSA id.
///
/// Append-only: one entry per lowered call, pushed in statement order, so an
/// entry's position is always the id of the statement that defined it.
#[derive(Debug, Default)]
pub struct ValueTable {
    values: Vec<clif_ir::Value>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the value of the statement at `index`. Returns `false` if that
    /// would break lockstep with statement order.
    pub fn define(&mut self, index: usize, value: clif_ir::Value) -> bool {
        if index != self.values.len() {
            return false;
        }
        self.values.push(value);
        true
    }

    pub fn get(&self, id: u32) -> Option<clif_ir::Value> {
        self.values.get(id as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
