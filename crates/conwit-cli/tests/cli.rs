//! End-to-end tests of the `conwit` binary: exit codes and the stdout
//! protocol. The full validation test skips itself without `gcc`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const PROGRAM: &str = "#include <pthread.h>
extern void reach_error();
int x = 0;
void *t1(void *arg) {
    x = 1;
    return 0;
}
int main(void) {
    pthread_t t;
    pthread_create(&t, 0, t1, 0);
    if (x == 1) {
        reach_error();
    }
    pthread_join(t, 0);
    return 0;
}
";

fn witness(kind: &str, steps: &[(usize, i64)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
 <key attr.name="witness-type" attr.type="string" for="graph" id="witness-type"/>
 <key attr.name="isEntryNode" attr.type="boolean" for="node" id="entry"><default>false</default></key>
 <key attr.name="startline" attr.type="int" for="edge" id="startline"/>
 <key attr.name="threadId" attr.type="string" for="edge" id="threadId"/>
 <graph edgedefault="directed">
"#,
    );
    xml.push_str(&format!("  <data key=\"witness-type\">{kind}</data>\n"));
    xml.push_str("  <node id=\"N0\"><data key=\"entry\">true</data></node>\n");
    for i in 1..=steps.len() {
        xml.push_str(&format!("  <node id=\"N{i}\"/>\n"));
    }
    for (i, (line, thread)) in steps.iter().enumerate() {
        xml.push_str(&format!(
            "  <edge source=\"N{}\" target=\"N{}\"><data key=\"startline\">{line}</data><data key=\"threadId\">{thread}</data></edge>\n",
            i,
            i + 1
        ));
    }
    xml.push_str(" </graph>\n</graphml>\n");
    xml
}

const SCHEDULE: &[(usize, i64)] = &[(10, 0), (5, 1), (11, 0)];

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn conwit(args: &[&Path], extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_conwit"))
        .args(args)
        .args(extra)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn gcc_available() -> bool {
    Command::new("gcc")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

#[test]
fn correctness_witness_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "prog.c", PROGRAM);
    let wit = write(dir.path(), "w.graphml", &witness("correctness_witness", &[]));
    let out = conwit(&[input.as_path(), Path::new("--witness"), wit.as_path()], &[]);
    assert!(stdout(&out).contains("Verdict: Correctness witness"));
    assert_eq!(out.status.code(), Some(255));
}

#[test]
fn unparsable_program_fails_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "prog.c", "int main( {\n");
    let wit = write(dir.path(), "w.graphml", &witness("violation_witness", SCHEDULE));
    let out = conwit(&[input.as_path(), Path::new("--graphml-witness"), wit.as_path()], &[]);
    assert!(stdout(&out).contains("Verdict: Parsing failed"));
    assert_eq!(out.status.code(), Some(255));
}

#[test]
fn missing_program_is_unknown_error() {
    let dir = tempfile::tempdir().unwrap();
    let wit = write(dir.path(), "w.graphml", &witness("violation_witness", SCHEDULE));
    let absent = dir.path().join("absent.c");
    let out = conwit(&[absent.as_path(), Path::new("--witness"), wit.as_path()], &[]);
    assert!(stdout(&out).contains("Verdict: Unknown error"));
    assert_eq!(out.status.code(), Some(255));
}

#[test]
fn emits_and_dumps_before_compiling() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "prog.c", PROGRAM);
    let wit = write(dir.path(), "w.graphml", &witness("violation_witness", SCHEDULE));
    let emitted = dir.path().join("out.c");
    let out = conwit(
        &[
            input.as_path(),
            Path::new("--witness"),
            wit.as_path(),
            Path::new("--emit"),
            emitted.as_path(),
        ],
        &["--dump-transitions", "--cc", "/nonexistent/conwit-cc"],
    );
    let text = stdout(&out);
    assert!(text.contains("\"startline\": 5"));
    assert!(text.contains("Verdict: Unknown error"));
    assert_eq!(out.status.code(), Some(255));

    let source = std::fs::read_to_string(&emitted).unwrap();
    assert!(source.starts_with("void yield(int, int);\nvoid release(int, int);\n"));
    assert!(source.contains("    yield(0, 1);\n    x = 1;\n    release(0, 1);\n"));
    assert!(source.contains("    yield(1, 0);\n    if (x == 1)\n    {\n        release(1, 0);\n"));
}

#[test]
fn verbose_run_logs_replay_counts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "prog.c", PROGRAM);
    let wit = write(dir.path(), "w.graphml", &witness("violation_witness", SCHEDULE));
    let out = Command::new(env!("CARGO_BIN_EXE_conwit"))
        .arg(&input)
        .arg("--witness")
        .arg(&wit)
        .args(["-v", "--cc", "/nonexistent/conwit-cc"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    let log = String::from_utf8_lossy(&out.stderr);
    assert!(log.contains("witness replayed barriers=2 pinned=0"));
    assert!(log.contains("error_function_relinked=false"));
}

#[test]
fn witnessed_schedule_always_reaches_error() {
    if !gcc_available() {
        eprintln!("gcc not available, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "prog.c", PROGRAM);
    let wit = write(dir.path(), "w.graphml", &witness("violation_witness", SCHEDULE));
    let out = conwit(&[input.as_path(), Path::new("--witness"), wit.as_path()], &["--trials", "3"]);
    let text = stdout(&out);
    assert!(text.contains("Compilation started"));
    assert!(text.contains("Compilation ended (exit code 0)"));
    assert!(text.contains("Reached error!"));
    assert!(text.contains("Released 1 (thread 1)"));
    assert!(text.contains("Execution ended (exit code 74)"));
    assert!(text.contains("Trials: 3 (error reached: 3, not reached: 0, timed out: 0)"));
    assert!(text.trim_end().ends_with("Verdict: ALWAYS"));
    assert_eq!(out.status.code(), Some(0));
}
