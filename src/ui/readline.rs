//! Readline wrapper with dashboard command completion.

use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};

/// Commands and the fixed values their first argument can take
#[derive(Debug, Clone, Default)]
pub struct Completions {
    commands: Vec<String>,
    arguments: BTreeMap<String, Vec<String>>,
}

impl Completions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, name: &str) -> Self {
        if !self.commands.iter().any(|c| c == name) {
            self.commands.push(name.to_string());
        }
        self
    }

    pub fn argument(mut self, command: &str, value: &str) -> Self {
        self = self.command(command);
        let values = self.arguments.entry(command.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
        self
    }

    /// Candidates for the word being typed, given the words before it
    fn candidates(&self, typed: &[&str], prefix: &str) -> Vec<String> {
        let pool: &[String] = match typed {
            [] => &self.commands,
            [command] => match self.arguments.get(&command.to_lowercase()) {
                Some(values) => values,
                None => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        let prefix = prefix.to_lowercase();
        pool.iter()
            .filter(|c| c.to_lowercase().starts_with(&prefix))
            .cloned()
            .sorted()
            .collect()
    }
}

pub struct CommandHelper {
    completions: Completions,
    hinter: HistoryHinter,
}

impl Helper for CommandHelper {}
impl Validator for CommandHelper {}
impl Highlighter for CommandHelper {}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let word_start = before
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let typed: Vec<&str> = before[..word_start].split_whitespace().collect();

        let pairs = self
            .completions
            .candidates(&typed, &before[word_start..])
            .into_iter()
            .map(|c| {
                let replacement = format!("{} ", c);
                Pair {
                    display: c,
                    replacement,
                }
            })
            .collect();

        Ok((word_start, pairs))
    }
}

/// Default history file: `<config_home>/marketdash/history`, or
/// `~/.marketdash_history` when no config directory is known.
pub fn default_history_path() -> PathBuf {
    dir_spec::config_home()
        .map(|dir| dir.join("marketdash").join("history"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".marketdash_history")
        })
}

/// Thin wrapper over `rustyline::Editor` with preset commands and history path.
pub struct Readline {
    editor: Editor<CommandHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Readline {
    pub fn new(completions: Completions, history_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .build();
        let helper = CommandHelper {
            completions,
            hinter: HistoryHinter::default(),
        };
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(helper));

        let history_path = history_path.unwrap_or_else(default_history_path);
        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = editor.load_history(&history_path);

        Ok(Self {
            editor,
            history_path,
        })
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        let line = self.editor.readline(prompt)?;
        if !line.trim().is_empty() {
            let _ = self.editor.add_history_entry(line.as_str());
            let _ = self.editor.append_history(&self.history_path);
        }
        Ok(line)
    }

    /// Completions with the replacement start index, without terminal input
    pub fn completions_with_start(&self, line: &str) -> Vec<(usize, String)> {
        if let Some(helper) = self.editor.helper() {
            let pos = line.len();
            let history = self.editor.history();
            if let Ok((start, pairs)) = helper.complete(line, pos, &Context::new(history)) {
                return pairs.into_iter().map(|p| (start, p.replacement)).collect();
            }
        }
        Vec::new()
    }
}
