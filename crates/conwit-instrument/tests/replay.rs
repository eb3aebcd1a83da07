//! Witness replay over parsed programs: barrier placement, value pinning and
//! the rendered result.

use conwit_cfront::{parse, render};
use conwit_instrument::{instrument, InstrumentError};
use conwit_witness::{Coords, Transition, TransitionMetadata};
use proptest::prelude::*;

fn at(line: usize, thread: Option<i64>, assumption: Option<&str>) -> Transition {
    Transition {
        coords: Some(Coords {
            startline: line,
            column: 0,
            endline: line,
            length: 0,
            content: String::new(),
        }),
        metadata: TransitionMetadata {
            thread_id: thread,
            assumption: assumption.map(str::to_string),
            ..TransitionMetadata::default()
        },
    }
}

const TWO_THREADS: &str = "int x;
void *t1(void *a) {
    x = 1;
    return 0;
}
int main() {
    pthread_t t;
    pthread_create(&t, 0, t1, 0);
    x = 2;
    return 0;
}
";

const LOOPS: &str = "int main() {
    int i = 0;
    while (i < 3) {
        i++;
    }
    if (i)
        i = 0;
    return i;
}
";

#[test]
fn two_thread_switches_get_numbered_barriers() {
    let mut tu = parse(TWO_THREADS).unwrap();
    let report = instrument(
        &mut tu,
        &[at(8, Some(0), None), at(3, Some(1), None), at(9, Some(0), None)],
    )
    .unwrap();
    assert_eq!(report.barriers.len(), 2);
    assert_eq!((report.barriers[0].seq, report.barriers[0].thread_id), (0, 1));
    assert_eq!((report.barriers[1].seq, report.barriers[1].thread_id), (1, 0));

    let out = render(&tu);
    assert!(out.contains("{\n    yield(0, 1);\n    x = 1;\n    release(0, 1);\n    return 0;\n}\n"));
    assert!(out.contains("    yield(1, 0);\n    x = 2;\n    release(1, 0);\n    return 0;\n"));
}

#[test]
fn loops_and_branches_release_inside_their_bodies() {
    let mut tu = parse(LOOPS).unwrap();
    instrument(
        &mut tu,
        &[at(2, Some(0), None), at(3, Some(1), None), at(6, Some(0), None)],
    )
    .unwrap();
    let out = render(&tu);
    assert!(out.contains(
        "    yield(0, 1);\n    while (i < 3)\n    {\n        release(0, 1);\n        i++;\n    }\n"
    ));
    assert!(out.contains(
        "    yield(1, 0);\n    if (i)\n    {\n        release(1, 0);\n        i = 0;\n    }\n"
    ));
}

#[test]
fn switch_past_the_program_is_incompatible() {
    let mut tu = parse(LOOPS).unwrap();
    let err = instrument(&mut tu, &[at(2, Some(0), None), at(50, Some(1), None)]).unwrap_err();
    assert_eq!(err, InstrumentError::NoTargetStatement { line: 50 });
    assert_eq!(err.verdict_reason(), "Incompatible witness");
}

/// Instruments `src` with a single switch from thread 0 to thread 1 at
/// `line` and returns the rendered program.
fn switched_at(src: &str, line: usize) -> String {
    let mut tu = parse(src).unwrap();
    let report = instrument(&mut tu, &[at(1, Some(0), None), at(line, Some(1), None)]).unwrap();
    assert_eq!(report.barriers.len(), 1);
    render(&tu)
}

#[test]
fn bare_block_gets_release_at_its_head() {
    let out = switched_at(
        "int main() {\n    int i = 0;\n    {\n        i = 1;\n    }\n    return i;\n}\n",
        3,
    );
    assert!(out.contains("    yield(0, 1);\n    {\n        release(0, 1);\n        i = 1;\n    }\n"));
}

#[test]
fn both_if_arms_get_release() {
    let out = switched_at(
        "int main() {\n    if (i)\n        a();\n    else\n        b();\n}\n",
        2,
    );
    assert!(out.contains(
        "    yield(0, 1);\n    if (i)\n    {\n        release(0, 1);\n        a();\n    }\n    else\n    {\n        release(0, 1);\n        b();\n    }\n"
    ));
}

#[test]
fn unbraced_for_body_is_wrapped() {
    let out = switched_at("int main() {\n    for (i = 0; i < 2; i++)\n        c();\n}\n", 2);
    assert!(out.contains(
        "    yield(0, 1);\n    for (i = 0; i < 2; i++)\n    {\n        release(0, 1);\n        c();\n    }\n"
    ));
}

#[test]
fn do_while_body_gets_release() {
    let out = switched_at("int main() {\n    do {\n        d();\n    } while (i);\n}\n", 2);
    assert!(out.contains(
        "    yield(0, 1);\n    do\n    {\n        release(0, 1);\n        d();\n    }\n    while (i);\n"
    ));
}

#[test]
fn switch_gets_release_after_it() {
    let out = switched_at(
        "int main() {\n    switch (i) {\n    case 1:\n        e();\n    }\n    return i;\n}\n",
        2,
    );
    assert!(out.contains(
        "    yield(0, 1);\n    switch (i)\n    {\n        case 1:\n        e();\n    }\n    release(0, 1);\n    return i;\n"
    ));
}

#[test]
fn return_gets_release_two_positions_later() {
    let out = switched_at("int main() {\n    i = 1;\n    return i;\n}\n", 3);
    assert!(out.contains("    yield(0, 1);\n    return i;\n    release(0, 1);\n"));
}

#[test]
fn labeled_statement_is_bracketed_as_a_whole() {
    let out = switched_at(
        "int main() {\n    goto again;\nagain: i = f();\n    return i;\n}\n",
        3,
    );
    assert!(out.contains("    yield(0, 1);\n    again:\n    i = f();\n    release(0, 1);\n    return i;\n"));
    assert!(!out.contains("again:\n    yield"));
}

#[test]
fn transitions_without_coords_do_not_switch() {
    let mut tu = parse(LOOPS).unwrap();
    let coordless = Transition {
        coords: None,
        metadata: TransitionMetadata {
            thread_id: Some(1),
            ..TransitionMetadata::default()
        },
    };
    let report = instrument(&mut tu, &[at(2, Some(0), None), coordless, at(3, Some(0), None)]).unwrap();
    assert!(report.barriers.is_empty());
    assert!(!render(&tu).contains("yield"));
}

#[test]
fn missing_thread_id_inherits_active_thread() {
    let mut tu = parse(LOOPS).unwrap();
    let report = instrument(&mut tu, &[at(2, Some(1), None), at(3, None, None)]).unwrap();
    assert!(report.barriers.is_empty());
}

#[test]
fn witnessed_values_are_pinned() {
    let src = "int main() {
    int n = __VERIFIER_nondet_int();
    unsigned char c;
    c = __VERIFIER_nondet_uchar();
    return n + c;
}
";
    let mut tu = parse(src).unwrap();
    let report = instrument(
        &mut tu,
        &[at(2, Some(0), Some("n == 5;")), at(4, Some(0), Some("c == 7;"))],
    )
    .unwrap();
    assert_eq!(report.pinned.len(), 2);
    assert_eq!(report.pinned[1].ty, "unsigned char");
    let out = render(&tu);
    assert!(out.contains("    int n = 5;\n"));
    assert!(out.contains("    c = ((unsigned char) 7);\n"));
}

#[test]
fn unconstrained_assignment_is_left_alone() {
    let src = "int main() {\n    int n = __VERIFIER_nondet_int();\n}\n";
    let mut tu = parse(src).unwrap();
    let report = instrument(&mut tu, &[at(2, Some(0), Some("m == 1;"))]).unwrap();
    assert!(report.pinned.is_empty());
    assert!(render(&tu).contains("int n = __VERIFIER_nondet_int();"));
}

fn straight_line_program() -> String {
    let mut src = String::from("int main() {\n");
    for k in 0..10 {
        src.push_str(&format!("    x = {k};\n"));
    }
    src.push_str("}\n");
    src
}

proptest! {
    /// One barrier per thread change, numbered 0, 1, 2, ... in witness order.
    #[test]
    fn barrier_numbers_strictly_increase(threads in prop::collection::vec(0i64..3, 1..10)) {
        let mut tu = parse(&straight_line_program()).unwrap();
        let transitions: Vec<Transition> = threads
            .iter()
            .enumerate()
            .map(|(i, &t)| at(i + 2, Some(t), None))
            .collect();
        let report = instrument(&mut tu, &transitions).unwrap();

        let switches = threads.windows(2).filter(|w| w[0] != w[1]).count();
        prop_assert_eq!(report.barriers.len(), switches);
        let seqs: Vec<u32> = report.barriers.iter().map(|b| b.seq).collect();
        prop_assert_eq!(seqs, (0..switches as u32).collect::<Vec<_>>());

        let out = render(&tu);
        prop_assert_eq!(out.matches("yield(").count(), switches);
        prop_assert_eq!(out.matches("release(").count(), switches);
        let positions: Vec<usize> = (0..switches)
            .filter_map(|seq| out.find(&format!("yield({seq},")))
            .collect();
        prop_assert_eq!(positions.len(), switches);
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
