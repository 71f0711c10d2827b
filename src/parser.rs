use crate::ast::{CommandSpec, Pipeline};

/// One lexed element of an input line.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A program name, argument, or redirection target.
    Word(String),
    /// Unquoted `|`.
    Pipe,
    /// Unquoted `<`.
    RedirectIn,
    /// Unquoted `>`.
    RedirectOut,
    /// Unquoted `&`.
    Ampersand,
}

/// States for the tokenizer state machine.
enum State {
    /// Between tokens — whitespace is skipped
    Normal,
    /// Building a word — whitespace or an operator ends it
    InWord,
    /// Inside double quotes — whitespace and operators are literal
    InDoubleQuote,
    /// Inside single quotes — everything is literal
    InSingleQuote,
}

/// Tokenize input into words and operators. Quoting and backslash make
/// characters literal; there is no expansion of any kind, so quoted text
/// collapses straight into the surrounding word.
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    // Distinguishes "no word in progress" from an empty quoted word (`""`),
    // which is a real, empty argument.
    let mut word_started = false;
    let mut state = State::Normal;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match (&state, ch) {
            // ── Normal state: between tokens ──
            (State::Normal, ' ' | '\t') => {}
            (State::Normal, '"') => {
                word_started = true;
                state = State::InDoubleQuote;
            }
            (State::Normal, '\'') => {
                word_started = true;
                state = State::InSingleQuote;
            }
            (State::Normal, '\\') => {
                word.push(chars.next().unwrap_or('\\'));
                word_started = true;
                state = State::InWord;
            }
            (State::Normal, '|') => tokens.push(Token::Pipe),
            (State::Normal, '<') => tokens.push(Token::RedirectIn),
            (State::Normal, '>') => tokens.push(Token::RedirectOut),
            (State::Normal, '&') => tokens.push(Token::Ampersand),
            (State::Normal, c) => {
                word.push(c);
                word_started = true;
                state = State::InWord;
            }

            // ── InWord state: building a token ──
            (State::InWord, ' ' | '\t') => {
                tokens.push(Token::Word(std::mem::take(&mut word)));
                word_started = false;
                state = State::Normal;
            }
            (State::InWord, '"') => {
                state = State::InDoubleQuote;
            }
            (State::InWord, '\'') => {
                state = State::InSingleQuote;
            }
            (State::InWord, '\\') => {
                word.push(chars.next().unwrap_or('\\'));
            }
            (State::InWord, '|' | '<' | '>' | '&') => {
                // An operator terminates the word it touches: `a|b` lexes
                // the same as `a | b`.
                tokens.push(Token::Word(std::mem::take(&mut word)));
                word_started = false;
                tokens.push(operator(ch));
                state = State::Normal;
            }
            (State::InWord, c) => {
                word.push(c);
            }

            // ── InDoubleQuote state: inside "..." ──
            (State::InDoubleQuote, '"') => {
                state = State::InWord;
            }
            (State::InDoubleQuote, '\\') => match chars.peek() {
                Some(&'"' | &'\\') => {
                    word.push(chars.next().unwrap_or('\\'));
                }
                _ => {
                    word.push('\\');
                }
            },
            (State::InDoubleQuote, c) => {
                word.push(c);
            }

            // ── InSingleQuote state: inside '...' ──
            (State::InSingleQuote, '\'') => {
                state = State::InWord;
            }
            (State::InSingleQuote, c) => {
                word.push(c);
            }
        }
    }

    // Flush the trailing word. An unclosed quote keeps whatever it
    // collected rather than erroring.
    if word_started {
        tokens.push(Token::Word(word));
    }

    tokens
}

fn operator(ch: char) -> Token {
    match ch {
        '|' => Token::Pipe,
        '<' => Token::RedirectIn,
        '>' => Token::RedirectOut,
        '&' => Token::Ampersand,
        _ => unreachable!("not an operator: {ch}"),
    }
}

/// Parse one input line into a pipeline of command descriptors.
///
/// Returns a shell-style message for syntax errors; the caller skips
/// dispatch entirely for such lines.
pub fn parse(input: &str) -> Result<Pipeline, String> {
    let mut stages: Vec<CommandSpec> = Vec::new();
    let mut argv: Vec<String> = Vec::new();
    let mut redirect_in: Option<String> = None;
    let mut redirect_out: Option<String> = None;
    let mut background = false;

    let mut tokens = tokenize(input).into_iter();
    while let Some(token) = tokens.next() {
        match token {
            Token::Word(w) => argv.push(w),
            Token::RedirectIn => match tokens.next() {
                // A later `<` replaces an earlier one — last one wins.
                Some(Token::Word(path)) => redirect_in = Some(path),
                _ => return Err("syntax error: expected filename after `<'".to_string()),
            },
            Token::RedirectOut => match tokens.next() {
                Some(Token::Word(path)) => redirect_out = Some(path),
                _ => return Err("syntax error: expected filename after `>'".to_string()),
            },
            Token::Pipe => {
                if argv.is_empty() {
                    return Err("syntax error near unexpected token `|'".to_string());
                }
                stages.push(CommandSpec {
                    argv: std::mem::take(&mut argv),
                    input: redirect_in.take(),
                    output: redirect_out.take(),
                    background: false,
                });
            }
            Token::Ampersand => {
                if argv.is_empty() {
                    return Err("syntax error near unexpected token `&'".to_string());
                }
                if tokens.next().is_some() {
                    return Err("syntax error: `&' must end the command".to_string());
                }
                background = true;
            }
        }
    }

    if argv.is_empty() {
        if stages.is_empty() {
            return Err("expected a command".to_string());
        }
        // Trailing pipe, e.g. `ls |`
        return Err("syntax error: expected command after `|'".to_string());
    }
    stages.push(CommandSpec {
        argv,
        input: redirect_in,
        output: redirect_out,
        background,
    });

    Ok(Pipeline { stages })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(stage: &CommandSpec) -> Vec<&str> {
        stage.argv.iter().map(String::as_str).collect()
    }

    #[test]
    fn simple_command() {
        let pipeline = parse("echo hello world").unwrap();
        assert_eq!(pipeline.stages.len(), 1);
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", "hello", "world"]);
        assert!(pipeline.stages[0].input.is_none());
        assert!(pipeline.stages[0].output.is_none());
        assert!(!pipeline.is_background());
    }

    #[test]
    fn pipeline_stages_in_order() {
        let pipeline = parse("ls -l | grep rs | wc").unwrap();
        assert_eq!(pipeline.stages.len(), 3);
        assert_eq!(argv(&pipeline.stages[0]), vec!["ls", "-l"]);
        assert_eq!(argv(&pipeline.stages[1]), vec!["grep", "rs"]);
        assert_eq!(argv(&pipeline.stages[2]), vec!["wc"]);
    }

    #[test]
    fn operators_without_spaces() {
        let pipeline = parse("ls|wc").unwrap();
        assert_eq!(pipeline.stages.len(), 2);
        assert_eq!(argv(&pipeline.stages[0]), vec!["ls"]);
        assert_eq!(argv(&pipeline.stages[1]), vec!["wc"]);
    }

    #[test]
    fn input_redirection() {
        let pipeline = parse("sort < data.txt").unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["sort"]);
        assert_eq!(pipeline.stages[0].input.as_deref(), Some("data.txt"));
    }

    #[test]
    fn output_redirection() {
        let pipeline = parse("ls > out.txt").unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["ls"]);
        assert_eq!(pipeline.stages[0].output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn both_redirections_on_one_stage() {
        let pipeline = parse("tr a-z A-Z < in.txt > out.txt").unwrap();
        let stage = &pipeline.stages[0];
        assert_eq!(argv(stage), vec!["tr", "a-z", "A-Z"]);
        assert_eq!(stage.input.as_deref(), Some("in.txt"));
        assert_eq!(stage.output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn redirection_before_command_name() {
        let pipeline = parse("< in.txt sort").unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["sort"]);
        assert_eq!(pipeline.stages[0].input.as_deref(), Some("in.txt"));
    }

    #[test]
    fn last_redirection_wins() {
        let pipeline = parse("cat > a.txt > b.txt").unwrap();
        assert_eq!(pipeline.stages[0].output.as_deref(), Some("b.txt"));
    }

    #[test]
    fn redirection_on_last_pipeline_stage() {
        let pipeline = parse("echo hi | cat > out.txt").unwrap();
        assert_eq!(pipeline.stages.len(), 2);
        assert!(pipeline.stages[0].output.is_none());
        assert_eq!(pipeline.stages[1].output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn trailing_ampersand_marks_background() {
        let pipeline = parse("sleep 5 &").unwrap();
        assert!(pipeline.is_background());
        assert_eq!(argv(&pipeline.stages[0]), vec!["sleep", "5"]);
    }

    #[test]
    fn background_pipeline() {
        let pipeline = parse("ls | wc &").unwrap();
        assert!(pipeline.is_background());
        assert!(!pipeline.stages[0].background);
        assert!(pipeline.stages[1].background);
    }

    #[test]
    fn ampersand_mid_line_is_error() {
        assert!(parse("sleep 5 & echo hi").is_err());
    }

    #[test]
    fn ampersand_alone_is_error() {
        assert!(parse("&").is_err());
    }

    #[test]
    fn empty_pipe_stage_is_error() {
        assert!(parse("ls | | wc").is_err());
        assert!(parse("| ls").is_err());
        assert!(parse("ls |").is_err());
    }

    #[test]
    fn missing_redirect_filename_is_error() {
        assert!(parse("cat <").is_err());
        assert!(parse("echo hi >").is_err());
        assert!(parse("cat < | wc").is_err());
    }

    #[test]
    fn empty_input_is_error() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn quoted_operators_are_literal() {
        let pipeline = parse("echo 'a | b'").unwrap();
        assert_eq!(pipeline.stages.len(), 1);
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", "a | b"]);

        let pipeline = parse(r#"echo "> file""#).unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", "> file"]);
        assert!(pipeline.stages[0].output.is_none());
    }

    #[test]
    fn double_quotes_preserve_spaces() {
        let pipeline = parse(r#"echo "hello   world""#).unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", "hello   world"]);
    }

    #[test]
    fn empty_quoted_argument_survives() {
        let pipeline = parse(r#"echo """#).unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", ""]);
    }

    #[test]
    fn quotes_mid_word_join_segments() {
        let pipeline = parse(r#"he"llo wor"ld"#).unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["hello world"]);
    }

    #[test]
    fn backslash_escapes_space() {
        let pipeline = parse(r"echo hello\ world").unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", "hello world"]);
    }

    #[test]
    fn backslash_escapes_operator() {
        let pipeline = parse(r"echo \| \&").unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", "|", "&"]);
    }

    #[test]
    fn backslash_in_double_quotes() {
        let pipeline = parse(r#"echo "a\"b""#).unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", "a\"b"]);
    }

    #[test]
    fn single_quotes_keep_backslash() {
        let pipeline = parse(r"echo 'a\nb'").unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", r"a\nb"]);
    }

    #[test]
    fn trailing_backslash_is_literal() {
        let pipeline = parse(r"echo foo\").unwrap();
        assert_eq!(argv(&pipeline.stages[0]), vec!["echo", r"foo\"]);
    }
}
