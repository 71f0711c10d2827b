/// One external program invocation, as handed over by the parser.
///
/// This is plain data: the parser fills it in, the executor decides how the
/// child's stdin and stdout actually get wired.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    /// Program name followed by its arguments. Never empty — `argv[0]` is
    /// the executable name or path handed to the OS.
    pub argv: Vec<String>,
    /// `< file` — read stdin from this file instead of the pipe/terminal.
    pub input: Option<String>,
    /// `> file` — write stdout to this file (create/truncate) instead of
    /// the pipe/terminal.
    pub output: Option<String>,
    /// Trailing `&`. Only meaningful on the last stage of a pipeline; see
    /// [`Pipeline::is_background`].
    pub background: bool,
}

impl CommandSpec {
    /// Display label for the job table, e.g. `sleep 5`.
    pub fn label(&self) -> String {
        self.argv.join(" ")
    }
}

/// A non-empty ordered sequence of stages where each stage's stdout feeds
/// the next stage's stdin.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<CommandSpec>,
}

impl Pipeline {
    /// Whether the whole pipeline runs without the shell waiting for it.
    ///
    /// Only the last stage's flag is authoritative — a trailing `&` belongs
    /// to the pipeline as a whole, not to any single stage. This is the
    /// parser-to-engine contract; the engine never re-derives it.
    pub fn is_background(&self) -> bool {
        self.stages.last().is_some_and(|stage| stage.background)
    }
}
