use anyhow::Result;
use colored::Colorize;
use ssajit_core::{CompiledIR, Operand, Statement};
use std::io::Write;

use crate::config::EmitterConfig;

pub struct IrEmitter {
    config: EmitterConfig,
}

impl IrEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn plain() -> Self {
        Self::new(EmitterConfig::plain())
    }

    pub fn emit<W: Write>(&self, ir: &CompiledIR, writer: &mut W) -> Result<()> {
        let params: Vec<String> = ir.params.iter().map(|p| self.ty(&p.to_string())).collect();
        writeln!(
            writer,
            "{} {}({}) -> {} {{",
            self.keyword("function"),
            self.name(&function_name(&ir.name)),
            params.join(", "),
            self.ty(&ir.result.to_string())
        )?;

        let indent = self.config.indent_style.as_string();
        for (index, stmt) in ir.statements.iter().enumerate() {
            match stmt {
                Statement::Call { op, operands } => {
                    write!(
                        writer,
                        "{}{} = {}",
                        indent,
                        self.operand(&Operand::Ssa(index as u32)),
                        self.op(op.name())
                    )?;
                    if !operands.is_empty() {
                        let operands: Vec<String> =
                            operands.iter().map(|o| self.operand(o)).collect();
                        write!(writer, " {}", operands.join(", "))?;
                    }
                    writeln!(writer)?;
                }
                Statement::Return(operand) => {
                    writeln!(
                        writer,
                        "{}{} {}",
                        indent,
                        self.keyword("return"),
                        self.operand(operand)
                    )?;
                }
            }
        }

        writeln!(writer, "}}")?;
        Ok(())
    }

    pub fn emit_to_string(&self, ir: &CompiledIR) -> Result<String> {
        let mut buffer = Vec::new();
        self.emit(ir, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn operand(&self, operand: &Operand) -> String {
        let text = operand.to_string();
        if !self.config.use_colors {
            return text;
        }
        match operand {
            Operand::Param(_) => text.yellow().to_string(),
            Operand::Ssa(_) => text.cyan().to_string(),
            Operand::ConstInt { .. } => text.magenta().to_string(),
        }
    }

    fn keyword(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_blue().bold().to_string())
    }

    fn name(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_white().to_string())
    }

    fn op(&self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    fn ty(&self, text: &str) -> String {
        self.paint(text, |t| t.blue().to_string())
    }

    fn paint(&self, text: &str, color: impl Fn(&str) -> String) -> String {
        if self.config.use_colors {
            color(text)
        } else {
            text.to_string()
        }
    }
}

impl Default for IrEmitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

/// `%name` for identifiers, otherwise `%"..."` with `"` and `\` escaped.
fn function_name(name: &str) -> String {
    if is_ident(name) {
        return format!("%{}", name);
    }

    let mut quoted = String::with_capacity(name.len() + 3);
    quoted.push_str("%\"");
    for c in name.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        _ => false,
    }
}

pub fn emit_json(ir: &CompiledIR) -> Result<String> {
    Ok(serde_json::to_string_pretty(ir)?)
}
