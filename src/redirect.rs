use std::fs::{File, OpenOptions};
use std::io;

/// Open file handles for one stage's explicit redirections.
///
/// Either handle, once mapped onto the child's stdio, supersedes whatever
/// pipe endpoint would otherwise land on that stream.
#[derive(Debug)]
pub struct StageIo {
    pub stdin: Option<File>,
    pub stdout: Option<File>,
}

/// Resolve a stage's redirections into zero, one, or two open file handles.
///
/// The error message names the offending path; the caller reports it and
/// skips the stage — siblings in the pipeline and the prompt loop are
/// unaffected. A handle opened before a later failure is dropped (and so
/// closed) on the error path.
pub fn resolve(input: Option<&str>, output: Option<&str>) -> Result<StageIo, String> {
    let stdin = match input {
        Some(path) => Some(open_input(path).map_err(|e| format!("{path}: {e}"))?),
        None => None,
    };
    let stdout = match output {
        Some(path) => Some(open_output(path).map_err(|e| format!("{path}: {e}"))?),
        None => None,
    };
    Ok(StageIo { stdin, stdout })
}

fn open_input(path: &str) -> io::Result<File> {
    File::open(path)
}

/// Create or truncate; mode 0644 on Unix so the file stays readable by
/// group and others.
fn open_output(path: &str) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path)
}
