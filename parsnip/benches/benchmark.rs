use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lazy_static::lazy_static;
use parsnip::grammar::GrammarFile;

const G2_SOURCE: &str = include_str!("../tests/test_files/g2.grammar");

lazy_static! {
    static ref ARITHMETIC_SOURCE: String = {
        let clause = "x1 + x2 * ( abc + d4 ) * e5 + f\n";
        clause.repeat(200)
    };
}

fn g2() -> GrammarFile {
    parsnip::parser::grammar(G2_SOURCE)
        .unwrap()
        .try_into()
        .unwrap()
}

pub fn lexing(c: &mut Criterion) {
    let file = g2();
    let lexer = file.lexer();
    c.bench_function("lex arithmetic source", |b| {
        b.iter(|| lexer.lex(black_box(&ARITHMETIC_SOURCE)).unwrap())
    });
}

pub fn lexer_build(c: &mut Criterion) {
    let file = g2();
    c.bench_function("build combined lexer dfa", |b| {
        b.iter(|| parsnip::lexer::Lexer::new(black_box(file.rules().to_vec())))
    });
}

pub fn table_build(c: &mut Criterion) {
    c.bench_function("build slr tables", |b| {
        b.iter(|| {
            let file = g2();
            let conflicts = file.augmented_cfg().slr1_table().conflicts();
            assert!(conflicts.is_empty());
        })
    });
}

pub fn parsing(c: &mut Criterion) {
    let file = g2();
    let tokens = file.tokenize("x1 + x2 * ( abc + d4 ) * e5 + f").unwrap();
    let parser = file.parser();
    c.bench_function("parse arithmetic expression", |b| {
        b.iter(|| parser.parse(black_box(&tokens)).unwrap())
    });
}

criterion_group!(benches, lexing, lexer_build, table_build, parsing);
criterion_main!(benches);
