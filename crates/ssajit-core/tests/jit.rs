use ssajit_core::{
    compile, CompileError, CompiledIR, Operand, Operator, ScalarType, Statement,
};

fn call(op: Operator, operands: Vec<Operand>) -> Statement {
    Statement::Call { op, operands }
}

#[test]
fn test_add_two_parameters() {
    let ir = CompiledIR::new(
        vec![ScalarType::I64, ScalarType::I64],
        ScalarType::I64,
        vec![
            call(Operator::Add, vec![Operand::Param(0), Operand::Param(1)]),
            Statement::Return(Operand::Ssa(0)),
        ],
    );

    let func = compile(&ir).unwrap();
    let add = func.entry::<extern "C" fn(i64, i64) -> i64>().unwrap();
    assert_eq!(add.call(3, 4), 7);
}

#[test]
fn test_scale_then_offset() {
    let ir = CompiledIR::new(
        vec![ScalarType::I64, ScalarType::I64],
        ScalarType::I64,
        vec![
            call(Operator::Mul, vec![Operand::Param(0), Operand::const_i64(3)]),
            call(Operator::Add, vec![Operand::Ssa(0), Operand::Param(1)]),
            Statement::Return(Operand::Ssa(1)),
        ],
    );

    let func = compile(&ir).unwrap();
    let f = func.entry::<extern "C" fn(i64, i64) -> i64>().unwrap();
    assert_eq!(f.call(2, 5), 11);
    assert_eq!(f.call(-1, 0), -3);
}

#[test]
fn test_validate_agrees_with_compile() {
    let cases = vec![
        vec![Statement::Return(Operand::Ssa(0))],
        vec![call(Operator::Add, vec![Operand::Param(0), Operand::Param(0)])],
        vec![
            call(
                Operator::Add,
                vec![Operand::Param(0), Operand::ConstInt { value: 1, width: 16 }],
            ),
            Statement::Return(Operand::Ssa(0)),
        ],
        vec![
            call(Operator::Add, vec![Operand::Param(0), Operand::Param(0)]),
            Statement::Return(Operand::Ssa(0)),
        ],
    ];

    for statements in cases {
        let ir = CompiledIR::new(vec![ScalarType::I64], ScalarType::I64, statements);
        let validated = ir.validate();
        let compiled = compile(&ir).map(|_| ());
        assert_eq!(validated, compiled, "{:?}", ir);
    }
}

#[test]
fn test_unsupported_type_produces_no_callable() {
    let ir = CompiledIR::new(
        vec![ScalarType::F64],
        ScalarType::F64,
        vec![Statement::Return(Operand::Ssa(0))],
    );
    assert_eq!(
        compile(&ir).unwrap_err(),
        CompileError::UnsupportedType("f64".to_string())
    );
}
