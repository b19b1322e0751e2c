use crate::config::CodegenConfig;
use crate::ir::{CompiledIR, Operand, Operator, Statement};
use crate::types::ScalarType;
use crate::CompileError;
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Ir(#[from] CompileError),
}

impl PersistError {
    /// The IR-level error, if the JSON was well formed but named something
    /// the IR cannot express.
    pub fn compile_error(&self) -> Option<&CompileError> {
        match self {
            PersistError::Ir(e) => Some(e),
            _ => None,
        }
    }
}

pub type PersistResult<T> = std::result::Result<T, PersistError>;

pub fn save_ir(ir: &CompiledIR, path: impl AsRef<Path>) -> PersistResult<()> {
    let json = serde_json::to_string_pretty(ir)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_ir(path: impl AsRef<Path>) -> PersistResult<CompiledIR> {
    let json = fs::read_to_string(path)?;
    ir_from_json(&json)
}

pub fn load_config(path: impl AsRef<Path>) -> PersistResult<CodegenConfig> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Reads IR from JSON. Operator names, statement kinds, operand kinds and
/// type tags outside the closed IR are reported as `CompileError`s, the same
/// way the text front-end reports them.
pub fn ir_from_json(json: &str) -> PersistResult<CompiledIR> {
    let raw: RawIr = serde_json::from_str(json)?;

    let params = raw
        .params
        .iter()
        .map(|tag| scalar_type(tag))
        .collect::<PersistResult<Vec<_>>>()?;
    let result = scalar_type(&raw.result)?;
    let statements = raw
        .statements
        .iter()
        .map(statement)
        .collect::<PersistResult<Vec<_>>>()?;

    let ir = CompiledIR::new(params, result, statements);
    Ok(match raw.name {
        Some(name) => ir.with_name(name),
        None => ir,
    })
}

#[derive(Deserialize)]
struct RawIr {
    name: Option<String>,
    params: Vec<String>,
    result: String,
    statements: Vec<Value>,
}

#[derive(Deserialize)]
struct RawCall {
    op: String,
    operands: Vec<Value>,
}

#[derive(Deserialize)]
struct RawConst {
    value: i64,
    width: u16,
}

fn scalar_type(tag: &str) -> PersistResult<ScalarType> {
    ScalarType::from_name(tag)
        .ok_or_else(|| CompileError::UnsupportedType(tag.to_string()).into())
}

fn statement(value: &Value) -> PersistResult<Statement> {
    match variant(value)? {
        ("Call", Some(body)) => {
            let call = RawCall::deserialize(body)?;
            let op = Operator::from_name(&call.op)?;
            let operands = call
                .operands
                .iter()
                .map(operand)
                .collect::<PersistResult<Vec<_>>>()?;
            Ok(Statement::Call { op, operands })
        }
        ("Return", Some(body)) => Ok(Statement::Return(operand(body)?)),
        ("Call" | "Return", None) => Err(shape_error(value)),
        (tag, _) => Err(CompileError::UnsupportedConstruct(format!("statement `{}`", tag)).into()),
    }
}

fn operand(value: &Value) -> PersistResult<Operand> {
    match variant(value)? {
        ("Param", Some(body)) => Ok(Operand::Param(u32::deserialize(body)?)),
        ("Ssa", Some(body)) => Ok(Operand::Ssa(u32::deserialize(body)?)),
        ("ConstInt", Some(body)) => {
            let RawConst { value, width } = RawConst::deserialize(body)?;
            Ok(Operand::ConstInt { value, width })
        }
        ("Param" | "Ssa" | "ConstInt", None) => Err(shape_error(value)),
        (tag, _) => Err(CompileError::UnsupportedConstruct(format!("operand `{}`", tag)).into()),
    }
}

/// Splits an externally tagged enum value into its tag and payload.
fn variant(value: &Value) -> PersistResult<(&str, Option<&Value>)> {
    match value {
        Value::String(tag) => Ok((tag.as_str(), None)),
        Value::Object(map) if map.len() == 1 => map
            .iter()
            .next()
            .map(|(tag, body)| (tag.as_str(), Some(body)))
            .ok_or_else(|| shape_error(value)),
        _ => Err(shape_error(value)),
    }
}

fn shape_error(value: &Value) -> PersistError {
    PersistError::Json(serde_json::Error::custom(format!(
        "expected a tagged statement or operand, found {}",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::config::OptLevel;
    use crate::invoke::InlineHint;
    use crate::types::ScalarType;
    use pretty_assertions::assert_eq;

    fn ir_with_call(call: &str) -> String {
        format!(
            r#"{{
                "name": "f",
                "params": ["i64", "i64"],
                "result": "i64",
                "statements": [{}, {{ "Return": {{ "Ssa": 0 }} }}]
            }}"#,
            call
        )
    }

    #[test]
    fn test_ir_survives_json_file() {
        let mut b = IrBuilder::new("scale");
        let x = b.param(ScalarType::I64);
        let y = b.param(ScalarType::I64);
        b.returns(ScalarType::I64);
        let three = b.const_int(3, 64);
        let scaled = b.mul(x, three);
        let sum = b.add(scaled, y);
        b.ret(sum);
        let ir = b.build();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scale.json");
        save_ir(&ir, &path).unwrap();
        assert_eq!(load_ir(&path).unwrap(), ir);
    }

    #[test]
    fn test_unknown_operator_in_json_is_unsupported_construct() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub.json");
        let json = ir_with_call(r#"{ "Call": { "op": "sub", "operands": [{ "Param": 0 }, { "Param": 1 }] } }"#);
        fs::write(&path, json).unwrap();

        let err = load_ir(&path).unwrap_err();
        assert_eq!(
            err.compile_error(),
            Some(&CompileError::UnsupportedConstruct("operator `sub`".to_string()))
        );
        assert_eq!(err.to_string(), "Unsupported construct: operator `sub`");
    }

    #[test]
    fn test_unknown_statement_and_operand_kinds_in_json() {
        let err = ir_from_json(&ir_with_call(r#"{ "Store": { "Param": 0 } }"#)).unwrap_err();
        assert_eq!(
            err.compile_error(),
            Some(&CompileError::UnsupportedConstruct("statement `Store`".to_string()))
        );

        let err = ir_from_json(&ir_with_call(r#""Nop""#)).unwrap_err();
        assert_eq!(
            err.compile_error(),
            Some(&CompileError::UnsupportedConstruct("statement `Nop`".to_string()))
        );

        let err = ir_from_json(&ir_with_call(
            r#"{ "Call": { "op": "add", "operands": [{ "Param": 0 }, { "Global": "counter" }] } }"#,
        ))
        .unwrap_err();
        assert_eq!(
            err.compile_error(),
            Some(&CompileError::UnsupportedConstruct("operand `Global`".to_string()))
        );
    }

    #[test]
    fn test_unknown_type_tag_in_json() {
        let json = r#"{ "params": ["u128"], "result": "i64", "statements": [] }"#;
        let err = ir_from_json(json).unwrap_err();
        assert_eq!(
            err.compile_error(),
            Some(&CompileError::UnsupportedType("u128".to_string()))
        );
    }

    #[test]
    fn test_long_operator_names_and_default_name_in_json() {
        let ir = ir_from_json(
            r#"{
                "params": ["i64"],
                "result": "i64",
                "statements": [
                    { "Call": { "op": "mul_int", "operands": [{ "Param": 0 }, { "ConstInt": { "value": -2, "width": 64 } }] } },
                    { "Return": { "Ssa": 0 } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(ir.name, "anon");
        assert_eq!(
            ir.statements[0],
            Statement::Call {
                op: Operator::Mul,
                operands: vec![Operand::Param(0), Operand::const_i64(-2)],
            }
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "opt_level": "none" }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.opt_level, OptLevel::None);
        assert!(config.verify);
        assert!(!config.capture_clif);
        assert_eq!(config.inline, InlineHint::Always);
    }

    #[test]
    fn test_config_selects_inline_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "inline": "default" }"#).unwrap();

        assert_eq!(load_config(&path).unwrap().inline, InlineHint::Default);
    }

    #[test]
    fn test_garbage_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_ir(&path).unwrap_err();
        assert!(matches!(err, PersistError::Json(_)));
        assert!(err.compile_error().is_none());

        let err = ir_from_json(&ir_with_call("[1, 2]")).unwrap_err();
        assert!(matches!(err, PersistError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_ir("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }
}
