//! The interactive loop over piped input.
//!
//! The loop reaps with `waitpid(-1)`, so this binary holds a single test.

use std::time::Duration;

use pipeshell::shell::{Runtime, Session};
use pipeshell_test_utils::builders::ConfigFileBuilder;
use pipeshell_test_utils::{SharedOutput, init_tracing, with_timeout};
use tokio::io::{AsyncWriteExt, BufReader};

#[tokio::test]
async fn finished_job_is_announced_while_waiting_for_input() {
    init_tracing();
    let cfg = ConfigFileBuilder::new().prompt("> ").build();
    let runtime = Runtime::new(Session::new(cfg)).unwrap();

    let (mut input, shell_side) = tokio::io::duplex(1024);
    let out = SharedOutput::default();

    let shell = runtime.run_with(BufReader::new(shell_side), out.clone());
    let user = async {
        input.write_all(b"sleep 0.2 &\n").await.unwrap();

        // No further input: only SIGCHLD can produce the notice.
        while !out.contents().contains("finished.") {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        input.write_all(b"jobs\nexit\n").await.unwrap();
    };

    let (result, ()) = with_timeout(async { tokio::join!(shell, user) }).await;
    result.unwrap();

    let text = out.contents();
    let pid = text
        .split("PID ")
        .nth(1)
        .and_then(|rest| rest.split(']').next())
        .expect("background start line");
    assert_eq!(
        text,
        format!(
            "> [background process started: PID {pid}]\n\
             > Process {pid} finished.\n\
             > Background jobs:\n\
             > exit\n"
        )
    );
}
