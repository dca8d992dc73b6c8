use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eof_vm::vm::instructions::op;
use eof_vm::{execute, validate, BasicHost, CodeMeta, ContainerBuilder};
use rand::Rng;

/// `n` sections of random straight-line arithmetic, each ending in RETF (STOP for the entry).
fn random_container(n: usize, len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let ops = [op::ADD, op::SUB, op::AND, op::XOR, op::LT];
    (0..n)
        .map(|i| {
            let mut code = vec![op::PUSH1, rng.gen(), op::PUSH1, rng.gen()];
            for _ in 0..len {
                code.extend_from_slice(&[op::PUSH1, rng.gen()]);
                code.push(ops[rng.gen_range(0..ops.len())]);
            }
            code.push(op::POP);
            code.push(op::POP);
            code.push(if i == 0 { op::STOP } else { op::RETF });
            code
        })
        .fold(ContainerBuilder::new(), |b, code| b.code(CodeMeta::new(0, 0, 3), code))
        .build()
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    for &n in &[1usize, 16, 256] {
        let bytes = random_container(n, 64);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &bytes, |b, bytes| {
            b.iter(|| black_box(validate(bytes).is_ok()))
        });
    }
    group.finish();
}

/// Section 0 counts down from 255, calling section 1 each iteration.
fn bench_callf_loop(c: &mut Criterion) {
    let entry = vec![
        op::PUSH1, 0xFF, // counter
        op::CALLF, 0x00, 0x01, // 2: loop head
        op::PUSH1, 0x01, op::SWAP1, op::SUB, // counter - 1
        op::DUP1, op::RJUMPI, 0xFF, 0xF5, // back to 2 while non-zero
        op::STOP,
    ];
    let bytes = ContainerBuilder::new()
        .code(CodeMeta::new(0, 0, 3), entry)
        .code(CodeMeta::new(0, 0, 1), vec![op::PUSH0, op::POP, op::RETF])
        .build();
    let Ok(container) = validate(&bytes) else {
        panic!("bench container must validate");
    };
    c.bench_function("callf_loop_255", |b| {
        b.iter(|| {
            let out = execute(&container, &mut BasicHost::default());
            black_box(out);
        })
    });
}

criterion_group!(benches, bench_validate, bench_callf_loop);
criterion_main!(benches);
