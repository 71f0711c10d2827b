use std::io;
use std::process::{Child, Command, Stdio};

use crate::ast::Pipeline;
use crate::jobs::JobTable;
use crate::redirect;

/// Status recorded for a stage that never ran (failed redirection).
const SETUP_FAILURE: i32 = 2;
/// Status recorded when the program image could not be found.
const NOT_FOUND: i32 = 127;
/// Status recorded when the program exists but cannot be executed.
const NOT_EXECUTABLE: i32 = 126;

/// Launch every stage of `pipeline` and either wait for the whole set
/// (foreground) or register each child with the job table (background).
///
/// Returns the last stage's exit code; a failed stage never terminates the
/// interpreter. `Err` is reserved for process creation itself failing —
/// the caller treats that as fatal, since the loop cannot keep dispatching
/// without the ability to spawn.
pub fn run(pipeline: &Pipeline, jobs: &mut JobTable) -> io::Result<i32> {
    let stage_count = pipeline.stages.len();

    // Every pipe exists before the first child is spawned, so no stage can
    // block waiting for a sibling that does not exist yet. Each endpoint
    // is moved into exactly one child's stdio or dropped by the parent
    // below — closed exactly once either way.
    let mut readers: Vec<Option<os_pipe::PipeReader>> = Vec::with_capacity(stage_count.saturating_sub(1));
    let mut writers: Vec<Option<os_pipe::PipeWriter>> = Vec::with_capacity(stage_count.saturating_sub(1));
    for _ in 1..stage_count {
        let (reader, writer) = os_pipe::pipe()?;
        readers.push(Some(reader));
        writers.push(Some(writer));
    }

    let mut statuses = vec![0i32; stage_count];
    let mut children: Vec<(usize, Child)> = Vec::with_capacity(stage_count);

    for (i, stage) in pipeline.stages.iter().enumerate() {
        let stage_io = match redirect::resolve(stage.input.as_deref(), stage.output.as_deref()) {
            Ok(stage_io) => stage_io,
            Err(message) => {
                eprintln!("brook: {message}");
                statuses[i] = SETUP_FAILURE;
                // The stage never runs; its pipe ends close with the
                // parent's drop below, so neighbors see EOF instead of
                // hanging.
                continue;
            }
        };

        let mut command = Command::new(&stage.argv[0]);
        command.args(&stage.argv[1..]);

        // An explicit redirection supersedes pipe wiring on its stream.
        // The superseded endpoint stays behind in the vec and is closed by
        // the parent with everything else.
        if let Some(file) = stage_io.stdin {
            command.stdin(Stdio::from(file));
        } else if i > 0 {
            if let Some(reader) = readers[i - 1].take() {
                command.stdin(Stdio::from(reader));
            }
        }
        if let Some(file) = stage_io.stdout {
            command.stdout(Stdio::from(file));
        } else if i + 1 < stage_count {
            if let Some(writer) = writers[i].take() {
                command.stdout(Stdio::from(writer));
            }
        }

        match command.spawn() {
            Ok(child) => children.push((i, child)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                eprintln!("brook: command not found: {}", stage.argv[0]);
                statuses[i] = NOT_FOUND;
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                eprintln!("brook: {}: {e}", stage.argv[0]);
                statuses[i] = NOT_EXECUTABLE;
            }
            // Anything else means the OS could not create a process at
            // all; the interpreter cannot limp on from that.
            Err(e) => return Err(e),
        }
    }

    // Close the parent's remaining pipe ends before waiting on anything.
    // A write end surviving in the parent would keep the downstream reader
    // from ever seeing end-of-input. Ends handed to children were moved
    // into their stdio and are already closed on this side.
    drop(readers);
    drop(writers);

    if pipeline.is_background() {
        // Hand every child over and return to the prompt immediately; the
        // reaper collects them on later iterations.
        for (i, child) in children {
            let (id, pid) = jobs.add(child, pipeline.stages[i].label());
            println!("[{id}] {pid}");
        }
        Ok(0)
    } else {
        // All stages were spawned before this first wait.
        for (i, mut child) in children {
            match child.wait() {
                Ok(status) => statuses[i] = exit_code(status),
                Err(e) => {
                    eprintln!("brook: wait: {e}");
                    statuses[i] = 1;
                }
            }
        }
        Ok(statuses.last().copied().unwrap_or(0))
    }
}

/// Derive a shell-style exit code from a process status.
///
/// A signal-terminated child has no exit code of its own; the usual shell
/// convention is `128 + signal`.
pub(crate) fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
