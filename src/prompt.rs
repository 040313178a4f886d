// ABOUTME: Layered instructions builder for the relay: assembles persona/style/rules into one prompt.
// ABOUTME: Compiles defaults from src/prompts/*.md, supports file-based overrides.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Compiled-in default instruction layers.
const DEFAULT_PERSONA: &str = include_str!("prompts/persona.md");
const DEFAULT_STYLE: &str = include_str!("prompts/style.md");
const DEFAULT_RULES: &str = include_str!("prompts/rules.md");

/// Name of the optional per-directory addendum.
pub const LOCAL_INSTRUCTIONS_FILE: &str = ".texbot.md";

/// Reads a file if it exists, returning None otherwise.
pub fn read_if_exists(path: &Path) -> Option<String> {
    if path.exists() {
        fs::read_to_string(path).ok()
    } else {
        None
    }
}

/// Assembles the relay's system instructions from layered sources: persona,
/// style, rules, and an optional local addendum. Each layer can be replaced
/// by a file of the same name in `~/.texbot/`.
#[derive(Debug, Clone)]
pub struct InstructionsBuilder {
    pub persona: String,
    pub style: String,
    pub rules: String,
    pub local: Option<String>,
}

impl InstructionsBuilder {
    /// Creates a new builder loaded with the compiled-in defaults.
    pub fn new() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            style: DEFAULT_STYLE.to_string(),
            rules: DEFAULT_RULES.to_string(),
            local: None,
        }
    }

    /// Replace layers with `persona.md`, `style.md`, or `rules.md` from `dir`.
    pub fn load_overrides_from(&mut self, dir: &Path) -> &mut Self {
        if let Some(content) = read_if_exists(&dir.join("persona.md")) {
            self.persona = content;
        }
        if let Some(content) = read_if_exists(&dir.join("style.md")) {
            self.style = content;
        }
        if let Some(content) = read_if_exists(&dir.join("rules.md")) {
            self.rules = content;
        }
        self
    }

    /// Checks `~/.texbot/` for override files.
    pub fn load_overrides(&mut self) -> &mut Self {
        self.load_overrides_from(&Config::base_dir())
    }

    /// Checks for `.texbot.md` in `dir` and sets `local`.
    pub fn load_local_from(&mut self, dir: &Path) -> &mut Self {
        self.local = read_if_exists(&dir.join(LOCAL_INSTRUCTIONS_FILE));
        self
    }

    /// Checks for `.texbot.md` in the current working directory.
    pub fn load_local(&mut self) -> &mut Self {
        self.load_local_from(&PathBuf::from("."))
    }

    /// Concatenates all non-empty layers separated by `"\n\n"`.
    pub fn build(&self) -> String {
        let layers: Vec<&str> = [
            Some(self.persona.as_str()),
            Some(self.style.as_str()),
            Some(self.rules.as_str()),
            self.local.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

        layers.join("\n\n")
    }
}

impl Default for InstructionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
