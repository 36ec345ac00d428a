mod common;

use grist::{Generator, GrammarSpec};

fn smoketest(spec: &GrammarSpec) -> Generator {
    let generator = Generator::new(spec).unwrap();
    eprintln!("grammar:\n{}", generator.grammar());
    eprintln!(
        "automaton:\n{}",
        generator.automaton().display(generator.grammar())
    );
    eprintln!("table:\n{}", generator.table().display(generator.grammar()));
    for resolution in generator.resolutions() {
        eprintln!("resolution: {}", resolution.display(generator.grammar()));
    }
    generator
}

#[test]
fn smoketest_arithmetic() {
    let generator = smoketest(&common::arithmetic());
    assert_eq!(generator.conflicts(), 0);
}

#[test]
fn smoketest_dangling_else() {
    let generator = smoketest(&common::dangling_else());
    assert_eq!(generator.conflicts(), 1);
}

#[test]
fn smoketest_with_nullable() {
    let generator = smoketest(&common::with_nullable());
    assert_eq!(generator.conflicts(), 0);
}

#[test]
fn smoketest_reduce_reduce() {
    let generator = smoketest(&common::reduce_reduce());
    assert_eq!(generator.conflicts(), 1);
}

#[test]
fn smoketest_chain() {
    let generator = smoketest(&common::chain());
    assert_eq!(generator.conflicts(), 0);
}

#[test]
fn smoketest_nonassoc() {
    let generator = smoketest(&common::nonassoc_eq());
    assert_eq!(generator.conflicts(), 0);
}
