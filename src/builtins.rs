use std::env;
use std::path::PathBuf;

use crate::state::ShellState;

/// The list of all builtin command names.
const BUILTINS: &[&str] = &["cd", "exit", "jobs"];

/// What the prompt loop should do after a builtin runs.
#[derive(Debug)]
pub enum BuiltinAction {
    Continue(i32),
    Exit(i32),
}

/// Returns true if the command name is a shell builtin.
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Execute a builtin command.
///
/// Only called for single-stage lines; inside a pipeline a builtin would
/// run in a child process and could not touch shell state, so those fall
/// through to the exec path instead.
pub fn run(program: &str, args: &[String], state: &mut ShellState) -> BuiltinAction {
    match program {
        "cd" => BuiltinAction::Continue(builtin_cd(args, &mut state.prev_dir)),
        "exit" => builtin_exit(args),
        "jobs" => BuiltinAction::Continue(builtin_jobs(state)),
        _ => {
            eprintln!("brook: unknown builtin: {program}");
            BuiltinAction::Continue(1)
        }
    }
}

/// Change directory. Three argument forms: none or `~` go to `$HOME`, `-`
/// goes to the recorded previous directory, anything else is taken as a
/// path. A successful change records where we were; a failed one leaves
/// the record untouched.
fn builtin_cd(args: &[String], prev_dir: &mut Option<PathBuf>) -> i32 {
    if args.len() > 1 {
        eprintln!("cd: too many arguments");
        return 1;
    }

    let current = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("cd: {e}");
            return 1;
        }
    };

    let target = match args.first().map(String::as_str) {
        None | Some("~") => match env::var("HOME") {
            Ok(home) => PathBuf::from(home),
            Err(_) => {
                eprintln!("cd: HOME not set");
                return 1;
            }
        },
        Some("-") => match prev_dir {
            Some(dir) => dir.clone(),
            None => {
                eprintln!("cd: no previous directory");
                return 1;
            }
        },
        Some(path) => PathBuf::from(path),
    };

    if let Err(e) = env::set_current_dir(&target) {
        eprintln!("cd: {}: {e}", target.display());
        return 1;
    }

    // Recording after the change makes `cd -` ping-pong between the two
    // most recent directories.
    *prev_dir = Some(current);
    0
}

fn builtin_exit(args: &[String]) -> BuiltinAction {
    match args.first() {
        None => BuiltinAction::Exit(0),
        Some(s) => match s.parse::<i32>() {
            Ok(code) => BuiltinAction::Exit(code),
            Err(_) => {
                eprintln!("exit: {s}: numeric argument required");
                BuiltinAction::Exit(2)
            }
        },
    }
}

/// List still-tracked background jobs.
fn builtin_jobs(state: &mut ShellState) -> i32 {
    // Reap first so anything that just finished reports as Done instead
    // of showing up in the listing.
    state.jobs.reap();

    for job in state.jobs.jobs_sorted() {
        println!("[{}]  Running   {}", job.id, job.command);
    }
    0
}
