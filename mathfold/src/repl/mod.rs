//! Interactive folding loop

use crate::config::{MathConfig, NumberType, SimplifyOptions};
use crate::error::{Error, Result};
use crate::parser::parse_expression;
use crate::simplify::Simplifier;
use clap::ValueEnum;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "fold> ";
const HISTORY_FILE: &str = ".mathfold_history";

/// What the loop should do after a `:` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Continue(String),
    Quit,
}

/// Settings and evaluation, independent of the terminal
pub struct Session {
    simplifier: Simplifier,
    options: SimplifyOptions,
}

impl Session {
    pub fn new(config: MathConfig, options: SimplifyOptions) -> Self {
        Self {
            simplifier: Simplifier::new().with_config(config),
            options,
        }
    }

    pub fn options(&self) -> &SimplifyOptions {
        &self.options
    }

    pub fn config(&self) -> &MathConfig {
        self.simplifier.config()
    }

    /// Parse and fold one line
    pub fn fold(&self, source: &str) -> Result<String> {
        let expr = parse_expression(source, self.simplifier.config())?;
        let folded = self.simplifier.simplify_constant(expr, &self.options)?;
        Ok(folded.to_string())
    }

    /// Handle a command starting with `:`
    pub fn handle_command(&mut self, line: &str) -> Command {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let argument = words.next();
        let message = match (command, argument) {
            (":quit" | ":q" | ":exit", _) => return Command::Quit,
            (":help" | ":h" | ":?", _) => help_text().to_string(),
            (":exact", Some("on")) => {
                self.options.exact_fractions = true;
                "exact fractions on".to_string()
            }
            (":exact", Some("off")) => {
                self.options.exact_fractions = false;
                "exact fractions off".to_string()
            }
            (":limit", Some("none")) => {
                self.options.fractions_limit = None;
                "fractions limit removed".to_string()
            }
            (":limit", Some(n)) => match n.parse::<u64>() {
                Ok(limit) => {
                    self.options.fractions_limit = Some(limit);
                    format!("fractions limit {limit}")
                }
                Err(_) => format!("invalid limit: {n}"),
            },
            (":number", Some(name)) => match NumberType::from_str(name, true) {
                Ok(number) => {
                    let config = MathConfig { number };
                    let simplifier = std::mem::take(&mut self.simplifier);
                    self.simplifier = simplifier.with_config(config);
                    format!("number type {name}")
                }
                Err(_) => format!("unknown number type: {name} (number, fraction, bignumber)"),
            },
            (":options", _) => format!("{:?} {:?}", self.config(), self.options),
            _ => format!("Unknown command: {line}\nType :help for help."),
        };
        Command::Continue(message)
    }
}

fn help_text() -> &'static str {
    "Commands:
  :help, :h, :?          Show this help
  :quit, :q              Exit
  :exact on|off          Store floats as exact fractions when lossless
  :limit N|none          Abandon fractions with numerator or denominator >= N
  :number TYPE           number, fraction or bignumber
  :options               Show the active settings

Anything else is parsed as an expression and constant-folded, e.g.
  x + 4*3/6
  [[1, 2], [3, 4]][2, x]"
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn new(session: Session) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            session,
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    pub fn run(&mut self) -> RlResult<()> {
        println!("mathfold {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        match self.session.handle_command(line) {
                            Command::Quit => break,
                            Command::Continue(message) => println!("{message}"),
                        }
                        continue;
                    }

                    match self.session.fold(line) {
                        Ok(result) => println!("{result}"),
                        Err(err) => print_error(&err),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }
}

fn print_error(err: &Error) {
    match err.span() {
        Some(span) => eprintln!("Error at {span}: {}", err.message()),
        None => eprintln!("Error: {}", err.message()),
    }
}

fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(MathConfig::default(), SimplifyOptions::default())
    }

    #[test]
    fn test_fold_line() {
        assert_eq!(session().fold("x + 4*3/6").unwrap(), "x + 2");
        assert_eq!(session().fold("1 - 3").unwrap(), "-2");
    }

    #[test]
    fn test_fold_reports_errors() {
        assert!(matches!(session().fold("1 +"), Err(Error::Parser { .. })));
        assert!(matches!(session().fold("a ? 1 : 2"), Err(Error::Fold(_))));
    }

    #[test]
    fn test_quit_variants() {
        let mut session = session();
        assert_eq!(session.handle_command(":quit"), Command::Quit);
        assert_eq!(session.handle_command(":q"), Command::Quit);
        assert_eq!(session.handle_command(":exit"), Command::Quit);
        assert!(matches!(session.handle_command(":help"), Command::Continue(_)));
    }

    #[test]
    fn test_exact_and_limit_commands() {
        let mut session = session();
        session.handle_command(":exact off");
        assert!(!session.options().exact_fractions);
        assert_eq!(session.fold("0.5 x").unwrap(), "0.5 x");

        session.handle_command(":exact on");
        session.handle_command(":limit 10");
        assert_eq!(session.options().fractions_limit, Some(10));
        session.handle_command(":limit none");
        assert_eq!(session.options().fractions_limit, None);

        let Command::Continue(message) = session.handle_command(":limit lots") else {
            panic!("Expected message");
        };
        assert!(message.contains("invalid limit"));
    }

    #[test]
    fn test_number_command() {
        let mut session = session();
        session.handle_command(":number bignumber");
        assert_eq!(session.config().number, NumberType::BigNumber);
        assert_eq!(session.fold("0.1 + 0.2").unwrap(), "0.3");
        let Command::Continue(message) = session.handle_command(":number decimal") else {
            panic!("Expected message");
        };
        assert!(message.contains("unknown number type"));
    }

    #[test]
    fn test_unknown_command() {
        let Command::Continue(message) = session().handle_command(":frob") else {
            panic!("Expected message");
        };
        assert!(message.starts_with("Unknown command"));
    }
}
