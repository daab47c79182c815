//! Session behaviour with real child processes.

use std::fs;

use pipeshell::shell::{Flow, Session, ShellEvent};
use pipeshell_test_utils::builders::ConfigFileBuilder;
use pipeshell_test_utils::poll_until;
use tempfile::tempdir;

fn step(session: &mut Session, line: &str) -> String {
    let mut out = Vec::new();
    let flow = session
        .step(ShellEvent::Line(line.to_string()), &mut out)
        .unwrap();
    assert_eq!(flow, Flow::Continue);
    String::from_utf8(out).unwrap()
}

#[test]
fn background_job_is_listed_then_announced() {
    let mut session = Session::new(ConfigFileBuilder::new().build());

    let started = step(&mut session, "sleep 0.2 &");
    assert!(started.starts_with("[background process started: PID "));
    let pid = started
        .trim()
        .trim_start_matches("[background process started: PID ")
        .trim_end_matches(']')
        .to_string();

    let listing = step(&mut session, "jobs");
    assert_eq!(
        listing,
        format!("Background jobs:\nPID: {pid}, Command: sleep\n")
    );

    let mut out = Vec::new();
    poll_until(|| (session.poll_jobs(&mut out).unwrap() > 0).then_some(()));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("Process {pid} finished.\n")
    );
    assert_eq!(step(&mut session, "jobs"), "Background jobs:\n");
}

#[test]
fn overflow_is_reported_and_shell_continues() {
    let cfg = ConfigFileBuilder::new().max_jobs(1).notify(false).build();
    let mut session = Session::new(cfg);

    step(&mut session, "sleep 0.2 &");
    let second = step(&mut session, "sleep 0.2 &");
    assert!(second.contains("[background process started: PID "));
    assert!(second.contains("error: too many background jobs"), "got {second:?}");
    assert_eq!(session.jobs().len(), 1);
}

#[test]
fn echo_parsed_then_execute() {
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("o.txt");
    let cfg = ConfigFileBuilder::new().echo_parsed(true).build();
    let mut session = Session::new(cfg);

    let line = format!("printf 'x y' | cut -d ' ' -f1 > {}", out_path.display());
    let echoed = step(&mut session, &line);

    assert_eq!(
        echoed,
        format!(
            "out: {}\nseq[0]: 'printf' 'x y'\nseq[1]: 'cut' '-d' ' ' '-f1'\n",
            out_path.display()
        )
    );
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "x\n");
}
