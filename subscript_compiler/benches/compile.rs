//! Compilation Benchmarks
//!
//! Measures end-to-end lowering of representative event scripts and the
//! pointer resolution done when serializing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use subscript_compiler::{compile, Environment};

const NPC_SCRIPT: &str = r#"
lock()
if LASTRESULT == 1:
    msgbox("Welcome back!", keepopen=True)
elif LASTRESULT == 2 or LASTRESULT == 3:
    message("Need a rest?")
    import special
    heal()
else:
    givepokemon(25, level=10)
    applymovement(LASTTALKED, ["walk_up", "exclaim", "walk_down"])
release()
exit
"#;

fn loop_script(iterations: usize) -> String {
    let mut source = String::from("V = Var(0x4000)\nF = Flag(0x200)\n");
    for _ in 0..iterations {
        source.push_str("while V < 10 and not F:\n    V += 1\n    message(\"Again\")\n");
    }
    source.push_str("exit\n");
    source
}

// =============================================================================
// Lowering
// =============================================================================

fn bench_compile(c: &mut Criterion) {
    let env = Environment::with_default_tables().unwrap();
    let mut group = c.benchmark_group("compile");

    group.bench_function("npc_script", |b| {
        b.iter(|| black_box(compile(black_box(NPC_SCRIPT), 0x0880_0000, &env)))
    });

    let looped = loop_script(50);
    group.bench_function("fifty_loops", |b| {
        b.iter(|| black_box(compile(black_box(&looped), 0x0880_0000, &env)))
    });

    group.finish();
}

// =============================================================================
// Serialization
// =============================================================================

fn bench_bytecode(c: &mut Criterion) {
    let env = Environment::with_default_tables().unwrap();
    let compiled = compile(&loop_script(50), 0x0880_0000, &env).unwrap();

    c.bench_function("bytecode_fifty_loops", |b| {
        b.iter(|| black_box(compiled.bytecode()))
    });
}

criterion_group!(benches, bench_compile, bench_bytecode);
criterion_main!(benches);
