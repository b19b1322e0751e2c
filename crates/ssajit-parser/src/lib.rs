/*! Parse text IR into a `CompiledIR`.
 *
 * Writing test programs by hand and inspecting what a front-end produced are
 * both easier with a text form. This parser reads that form back into the
 * closed IR model, rejecting constructs the model cannot express at the
 * point where they are read.
 */

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use ssajit_core::{CompileError, CompiledIR, Operand, Operator, ScalarType, Statement};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct IrParser;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error:\n{0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Line {line}: invalid literal `{text}`")]
    Literal { line: usize, text: String },

    #[error("Line {line}: {source}")]
    Ir { line: usize, source: CompileError },

    #[error("Unexpected parse tree: {0}")]
    Grammar(String),
}

impl ParseError {
    /// The IR-level error, if the text parsed but could not be expressed.
    pub fn compile_error(&self) -> Option<&CompileError> {
        match self {
            ParseError::Ir { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

pub fn parse(input: &str) -> Result<Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
    IrParser::parse(Rule::module, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

pub fn parse_ir(input: &str) -> ParseResult<CompiledIR> {
    let mut pairs = parse(input)?;
    let function = pairs
        .next()
        .and_then(|module| module.into_inner().find(|p| p.as_rule() == Rule::function))
        .ok_or_else(|| ParseError::Grammar("no function in module".to_string()))?;
    build_function(function)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<CompiledIR> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_ir(&text)
}

fn build_function(pair: Pair<'_, Rule>) -> ParseResult<CompiledIR> {
    let mut name = None;
    let mut params = Vec::new();
    let mut result = None;
    let mut statements = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::func_name => name = Some(function_name(inner.as_str())),
            Rule::param_list => {
                for ty in inner.into_inner() {
                    params.push(scalar_type(&ty)?);
                }
            }
            Rule::type_name => result = Some(scalar_type(&inner)?),
            Rule::call_stmt => {
                let stmt = call_stmt(inner, statements.len())?;
                statements.push(stmt);
            }
            Rule::return_stmt => {
                let operand = inner
                    .into_inner()
                    .find(|p| p.as_rule() != Rule::kw_return)
                    .ok_or_else(|| ParseError::Grammar("return without operand".to_string()))?;
                statements.push(Statement::Return(operand_of(operand)?));
            }
            Rule::other_stmt => {
                let head = inner.as_str().split_whitespace().next().unwrap_or_default();
                return Err(ir_error(
                    &inner,
                    CompileError::UnsupportedConstruct(format!("statement `{}`", head)),
                ));
            }
            _ => {}
        }
    }

    let result = result.ok_or_else(|| ParseError::Grammar("missing result type".to_string()))?;
    let ir = CompiledIR::new(params, result, statements);
    Ok(match name {
        Some(name) => ir.with_name(name),
        None => ir,
    })
}

fn call_stmt(pair: Pair<'_, Rule>, index: usize) -> ParseResult<Statement> {
    let mut inner = pair.into_inner();
    let (Some(def), Some(op)) = (inner.next(), inner.next()) else {
        return Err(ParseError::Grammar("incomplete call statement".to_string()));
    };

    let label = &def.as_str()[1..];
    if label.parse::<usize>().ok() != Some(index) {
        return Err(ir_error(
            &def,
            CompileError::MalformedIR(format!(
                "`{}` defined by statement {}; SSA ids must follow statement order",
                def.as_str(),
                index
            )),
        ));
    }

    let op = Operator::from_name(op.as_str()).map_err(|e| ir_error(&op, e))?;
    let operands = inner
        .next()
        .map(|operands| {
            operands
                .into_inner()
                .map(operand_of)
                .collect::<ParseResult<Vec<_>>>()
        })
        .unwrap_or_else(|| Ok(Vec::new()))?;

    Ok(Statement::Call { op, operands })
}

fn operand_of(pair: Pair<'_, Rule>) -> ParseResult<Operand> {
    match pair.as_rule() {
        Rule::param_ref => Ok(Operand::Param(index_of(&pair)?)),
        Rule::ssa_ref => Ok(Operand::Ssa(index_of(&pair)?)),
        Rule::const_int => {
            let mut parts = pair.into_inner();
            let (Some(lit), Some(ty)) = (parts.next(), parts.next()) else {
                return Err(ParseError::Grammar("incomplete constant".to_string()));
            };
            let value = lit.as_str().parse::<i64>().map_err(|_| literal_error(&lit))?;
            let width = match ty.as_str()[1..].parse::<u16>() {
                Ok(width) => width,
                Err(_) => {
                    return Err(ir_error(
                        &ty,
                        CompileError::UnsupportedType(ty.as_str().to_string()),
                    ))
                }
            };
            Ok(Operand::ConstInt { value, width })
        }
        Rule::other_operand => Err(ir_error(
            &pair,
            CompileError::UnsupportedConstruct(format!("operand `{}`", pair.as_str())),
        )),
        other => Err(ParseError::Grammar(format!("unexpected operand rule {:?}", other))),
    }
}

/// Strips the `%` sigil and undoes the quoting of non-identifier names.
fn function_name(text: &str) -> String {
    let text = text.strip_prefix('%').unwrap_or(text);
    let Some(quoted) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) else {
        return text.to_string();
    };

    let mut name = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => name.extend(chars.next()),
            c => name.push(c),
        }
    }
    name
}

fn scalar_type(pair: &Pair<'_, Rule>) -> ParseResult<ScalarType> {
    ScalarType::from_name(pair.as_str()).ok_or_else(|| {
        ir_error(
            pair,
            CompileError::UnsupportedType(pair.as_str().to_string()),
        )
    })
}

fn index_of(pair: &Pair<'_, Rule>) -> ParseResult<u32> {
    pair.as_str()[1..]
        .parse::<u32>()
        .map_err(|_| literal_error(pair))
}

fn line_of(pair: &Pair<'_, Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn ir_error(pair: &Pair<'_, Rule>, source: CompileError) -> ParseError {
    ParseError::Ir {
        line: line_of(pair),
        source,
    }
}

fn literal_error(pair: &Pair<'_, Rule>) -> ParseError {
    ParseError::Literal {
        line: line_of(pair),
        text: pair.as_str().to_string(),
    }
}
