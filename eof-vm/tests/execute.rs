use eof_vm::vm::instructions::op;
use eof_vm::{
    execute, validate, BasicHost, CodeMeta, Container, ContainerBuilder, ExecutionOutcome, Halt,
    Limits, Vm, Word,
};

fn build(sections: Vec<(CodeMeta, Vec<u8>)>) -> Container {
    let bytes = sections
        .into_iter()
        .fold(ContainerBuilder::new(), |b, (meta, code)| b.code(meta, code))
        .build();
    validate(&bytes).unwrap()
}

fn run(c: &Container) -> ExecutionOutcome {
    execute(c, &mut BasicHost::default())
}

#[test]
fn scenario_1_single_nop() {
    let bytes = hex::decode("EF0001010004020001000103000000000000005B").unwrap();
    let c = validate(&bytes).unwrap();
    assert_eq!(
        run(&c),
        ExecutionOutcome::Success {
            stack: vec![],
            gas_used: 1
        }
    );
}

#[test]
fn scenario_2_callf_then_retf() {
    let c = build(vec![
        (CodeMeta::new(0, 0, 0), vec![op::CALLF, 0x00, 0x01, op::RETF]),
        (CodeMeta::new(0, 0, 0), vec![op::RETF]),
    ]);
    assert_eq!(
        run(&c),
        ExecutionOutcome::Success {
            stack: vec![],
            gas_used: 5 + 3 + 3
        }
    );
}

#[test]
fn scenario_5_retf_with_too_few_outputs() {
    let c = build(vec![
        (CodeMeta::new(0, 0, 2), vec![op::CALLF, 0x00, 0x01, op::STOP]),
        (CodeMeta::new(0, 2, 1), vec![op::PUSH1, 0x01, op::RETF]),
    ]);
    assert_eq!(
        run(&c),
        ExecutionOutcome::ExceptionalHalt {
            reason: Halt::RetfOutputMismatch {
                expected: 2,
                actual: 1
            },
            section: 1,
            pc: 2,
            return_depth: 2,
        }
    );
}

#[test]
fn retf_with_too_many_outputs() {
    let c = build(vec![
        (CodeMeta::new(0, 0, 2), vec![op::CALLF, 0x00, 0x01, op::STOP]),
        (CodeMeta::new(0, 0, 1), vec![op::PUSH0, op::RETF]),
    ]);
    assert_eq!(
        run(&c).halt_reason(),
        Some(&Halt::RetfOutputMismatch {
            expected: 0,
            actual: 1
        })
    );
}

#[test]
fn scenario_6_return_stack_overflow() {
    // Section i calls i + 1; the last section calls itself.
    let n = 1024usize;
    let sections = (0..n)
        .map(|i| {
            let target = (i + 1).min(n - 1) as u16;
            let [hi, lo] = target.to_be_bytes();
            (CodeMeta::new(0, 0, 0), vec![op::CALLF, hi, lo, op::RETF])
        })
        .collect();
    let c = build(sections);
    assert_eq!(
        run(&c),
        ExecutionOutcome::ExceptionalHalt {
            reason: Halt::ReturnStackOverflow { limit: 1024 },
            section: n - 1,
            pc: 0,
            return_depth: 1024,
        }
    );
}

#[test]
fn return_stack_limit_is_configurable() {
    let c = build(vec![
        (CodeMeta::new(0, 0, 0), vec![op::CALLF, 0x00, 0x01, op::STOP]),
        (CodeMeta::new(0, 0, 0), vec![op::CALLF, 0x00, 0x01, op::RETF]),
    ]);
    let limits = Limits {
        return_stack_limit: 4,
        ..Limits::default()
    };
    let out = Vm::new(limits).run(&c, &mut BasicHost::default());
    match out {
        ExecutionOutcome::ExceptionalHalt {
            reason,
            return_depth,
            ..
        } => {
            assert_eq!(reason, Halt::ReturnStackOverflow { limit: 4 });
            assert_eq!(return_depth, 4);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn callee_cannot_pop_below_its_floor() {
    let c = build(vec![
        (
            CodeMeta::new(0, 0, 2),
            vec![op::PUSH1, 7, op::PUSH1, 8, op::CALLF, 0x00, 0x01, op::STOP],
        ),
        (CodeMeta::new(1, 1, 1), vec![op::POP, op::POP, op::PUSH0, op::RETF]),
    ]);
    assert_eq!(
        run(&c),
        ExecutionOutcome::ExceptionalHalt {
            reason: Halt::StackUnderflow {
                required: 1,
                available: 0
            },
            section: 1,
            pc: 1,
            return_depth: 2,
        }
    );
}

#[test]
fn callf_needs_visible_inputs() {
    let c = build(vec![
        (CodeMeta::new(0, 0, 1), vec![op::PUSH0, op::CALLF, 0x00, 0x01, op::STOP]),
        (CodeMeta::new(0, 0, 1), vec![op::CALLF, 0x00, 0x02, op::RETF]),
        (CodeMeta::new(1, 0, 1), vec![op::POP, op::RETF]),
    ]);
    assert_eq!(
        run(&c),
        ExecutionOutcome::ExceptionalHalt {
            reason: Halt::StackUnderflow {
                required: 1,
                available: 0
            },
            section: 1,
            pc: 0,
            return_depth: 2,
        }
    );
}

#[test]
fn outputs_stay_on_the_shared_stack() {
    // f(a, b) = a - b, called with (10, 3); the caller keeps an extra item below.
    let c = build(vec![
        (
            CodeMeta::new(0, 0, 3),
            vec![
                op::PUSH1, 0xAA, op::PUSH1, 3, op::PUSH1, 10, op::CALLF, 0x00, 0x01, op::STOP,
            ],
        ),
        (CodeMeta::new(2, 1, 2), vec![op::SUB, op::RETF]),
    ]);
    match run(&c) {
        ExecutionOutcome::Success { stack, gas_used } => {
            assert_eq!(stack, vec![Word::from(0xAA), Word::from(7)]);
            assert_eq!(gas_used, 3 * 3 + 5 + 3 + 3);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn data_stack_overflow_halts() {
    let c = build(vec![(
        CodeMeta::new(0, 0, 1023),
        vec![op::PUSH0, op::RJUMP, 0xFF, 0xFC],
    )]);
    assert_eq!(
        run(&c),
        ExecutionOutcome::ExceptionalHalt {
            reason: Halt::StackOverflow { limit: 1024 },
            section: 0,
            pc: 0,
            return_depth: 1,
        }
    );
}

#[test]
fn callf_checks_callee_headroom() {
    let c = build(vec![
        (
            CodeMeta::new(0, 0, 2),
            vec![op::PUSH0, op::PUSH0, op::CALLF, 0x00, 0x01, op::STOP],
        ),
        (CodeMeta::new(0, 0, 1023), vec![op::RETF]),
    ]);
    assert_eq!(
        run(&c).halt_reason(),
        Some(&Halt::CallfStackLimit {
            height: 2,
            max_stack_height: 1023
        })
    );

    let c = build(vec![
        (CodeMeta::new(0, 0, 1), vec![op::PUSH0, op::CALLF, 0x00, 0x01, op::STOP]),
        (CodeMeta::new(0, 0, 1023), vec![op::RETF]),
    ]);
    assert!(run(&c).is_success());
}

#[test]
fn gas_costs_of_call_instructions() {
    let c = build(vec![
        (CodeMeta::new(0, 0, 0), vec![op::NOP, op::CALLF, 0x00, 0x01, op::NOP, op::STOP]),
        (CodeMeta::new(0, 0, 0), vec![op::NOP, op::RETF]),
    ]);
    assert_eq!(run(&c).gas_used(), Some(1 + 5 + 1 + 3 + 1));

    // Enough for the first NOP, not for CALLF.
    let mut host = BasicHost::new(3);
    let out = execute(&c, &mut host);
    assert_eq!(
        out,
        ExecutionOutcome::ExceptionalHalt {
            reason: Halt::OutOfGas,
            section: 0,
            pc: 1,
            return_depth: 1,
        }
    );
}

#[test]
fn vm_is_reentrant() {
    let c = build(vec![
        (CodeMeta::new(0, 0, 2), vec![op::PUSH1, 2, op::PUSH1, 3, op::CALLF, 0, 1, op::STOP]),
        (CodeMeta::new(2, 1, 2), vec![op::ADD, op::RETF]),
    ]);
    let vm = Vm::default();
    let first = vm.run(&c, &mut BasicHost::default());
    let second = vm.run(&c, &mut BasicHost::default());
    assert_eq!(first, second);
    assert!(first.is_success());
}

#[test]
fn revert_is_reported() {
    let c = build(vec![(
        CodeMeta::new(0, 0, 2),
        vec![op::PUSH0, op::PUSH0, op::REVERT],
    )]);
    assert_eq!(run(&c), ExecutionOutcome::Revert { gas_used: 4 });
}
