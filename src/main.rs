mod ast;
mod builtins;
mod executor;
mod jobs;
mod parser;
mod prompt;
mod redirect;
mod state;

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::builtins::BuiltinAction;
use crate::state::ShellState;

fn main() {
    ctrlc::set_handler(|| {
        println!();
        let _ = io::stdout().flush();
    })
    .expect("Failed to set Ctrl-C handler");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut state = ShellState::new();
    let mut last_exit_code: i32 = 0;

    loop {
        // Collect any background children that finished since the last
        // prompt, before dispatching anything new.
        state.jobs.reap();

        print!("{}", prompt::render());
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => {
                println!("\n{}", "Goodbye".red());
                break;
            }
            Ok(_) => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match dispatch(trimmed, &mut state) {
                    Dispatch::Status(code) => last_exit_code = code,
                    Dispatch::Exit(code) => {
                        println!("{}", "Goodbye".red());
                        last_exit_code = code;
                        break;
                    }
                    Dispatch::Fatal(e) => {
                        eprintln!("brook: cannot spawn process: {e}");
                        last_exit_code = 2;
                        break;
                    }
                }
            }
            Err(error) => {
                eprintln!("brook: error reading input: {error}");
                break;
            }
        }
    }

    std::process::exit(last_exit_code);
}

enum Dispatch {
    /// The line ran (or failed); the loop continues.
    Status(i32),
    /// The `exit` builtin asked to leave with this code.
    Exit(i32),
    /// Process creation failed — the loop cannot continue.
    Fatal(io::Error),
}

/// Parse one line and run it: builtin, single command, or pipeline.
fn dispatch(line: &str, state: &mut ShellState) -> Dispatch {
    let pipeline = match parser::parse(line) {
        Ok(pipeline) => pipeline,
        Err(message) => {
            eprintln!("brook: {message}");
            return Dispatch::Status(1);
        }
    };

    // Builtins apply only to a plain single command; inside a pipeline
    // they would run in a child and could not touch shell state.
    if pipeline.stages.len() == 1 {
        let stage = &pipeline.stages[0];
        if builtins::is_builtin(&stage.argv[0]) {
            return match builtins::run(&stage.argv[0], &stage.argv[1..], state) {
                BuiltinAction::Continue(code) => Dispatch::Status(code),
                BuiltinAction::Exit(code) => Dispatch::Exit(code),
            };
        }
    }

    match executor::run(&pipeline, &mut state.jobs) {
        Ok(code) => Dispatch::Status(code),
        Err(e) => Dispatch::Fatal(e),
    }
}
