use std::collections::HashMap;
use std::io;
use std::process::Child;

/// A single tracked background process.
pub struct Job {
    pub id: usize,
    pub pid: u32,
    /// Display label, e.g. `sleep 5`.
    pub command: String,
    pub child: Child,
}

/// The background job set: every still-possibly-running child spawned with
/// a trailing `&`, keyed by job id.
///
/// Mutated only from the prompt loop — [`JobTable::add`] right after a
/// background spawn, [`JobTable::reap`] once per iteration. Foreground
/// children are waited on directly and never enter the table.
pub struct JobTable {
    jobs: HashMap<usize, Job>,
    next_id: usize,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            next_id: 1,
        }
    }

    /// Track a freshly spawned background child. Returns `(job_id, pid)`.
    pub fn add(&mut self, child: Child, command: String) -> (usize, u32) {
        let id = self.next_id;
        let pid = child.id();
        self.jobs.insert(
            id,
            Job {
                id,
                pid,
                command,
                child,
            },
        );
        self.next_id += 1;
        (id, pid)
    }

    /// Non-blocking poll of every tracked job. Prints `[N]  Done  cmd` for
    /// each finished child and removes it; never blocks on a live one.
    ///
    /// Safe to call any number of times in a row: an id is removed at most
    /// once, and a poll that finds nothing left to observe (the child was
    /// already collected) removes the entry without complaint.
    pub fn reap(&mut self) {
        let mut done = Vec::new();

        for (id, job) in self.jobs.iter_mut() {
            match job.child.try_wait() {
                Ok(Some(_status)) => {
                    println!("[{}]  Done  {}", job.id, job.command);
                    done.push(*id);
                }
                Ok(None) => {} // still running
                Err(e) if already_reaped(&e) => done.push(*id),
                Err(e) => {
                    eprintln!("brook: job {}: {}", id, e);
                }
            }
        }

        for id in done {
            self.jobs.remove(&id);
        }
    }

    /// Stop tracking a job, handing its [`Child`] back to the caller.
    pub fn remove(&mut self, id: usize) -> Option<Job> {
        self.jobs.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// All tracked jobs ordered by job id, for the `jobs` builtin.
    pub fn jobs_sorted(&self) -> Vec<&Job> {
        let mut list: Vec<&Job> = self.jobs.values().collect();
        list.sort_by_key(|job| job.id);
        list
    }
}

/// Whether a wait error means the child was already collected (or was
/// never a child of this process) — an expected race, not a failure.
#[cfg(unix)]
fn already_reaped(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ECHILD)
}

#[cfg(not(unix))]
fn already_reaped(_err: &io::Error) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::Duration;

    #[cfg(unix)]
    fn spawn_sleep(seconds: &str) -> Child {
        Command::new("sleep")
            .arg(seconds)
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn sleep")
    }

    #[test]
    fn reap_on_empty_table_is_idempotent() {
        let mut table = JobTable::new();
        table.reap();
        table.reap();
        assert!(table.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn reap_removes_finished_job() {
        let mut table = JobTable::new();
        let quick = Command::new("true")
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn true");
        table.add(quick, "true".to_string());

        // Poll until the child has exited and the table drains.
        for _ in 0..100 {
            table.reap();
            if table.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(table.is_empty());

        // A second pass over the already-drained table must be a no-op.
        table.reap();
        assert!(table.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn reap_keeps_running_job() {
        let mut table = JobTable::new();
        let (id, _pid) = table.add(spawn_sleep("5"), "sleep 5".to_string());

        table.reap();
        assert_eq!(table.len(), 1);

        let mut job = table.remove(id).expect("job still tracked");
        job.child.kill().expect("kill sleep");
        let _ = job.child.wait();
    }

    #[cfg(unix)]
    #[test]
    fn job_ids_are_assigned_in_order() {
        let mut table = JobTable::new();
        let (first, _) = table.add(spawn_sleep("5"), "sleep 5".to_string());
        let (second, _) = table.add(spawn_sleep("5"), "sleep 5".to_string());
        assert!(first < second);

        let ids: Vec<usize> = table.jobs_sorted().iter().map(|job| job.id).collect();
        assert_eq!(ids, vec![first, second]);

        for id in [first, second] {
            let mut job = table.remove(id).unwrap();
            let _ = job.child.kill();
            let _ = job.child.wait();
        }
    }
}
