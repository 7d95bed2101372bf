//! Lexer configuration
//!
//! Settings come from `defaults/chatlex.default.toml`, compiled in, then from
//! any files and single keys a caller adds through [`Loader`]. A template
//! directory may carry a `chatlex.toml` of its own.
//!
//! ```toml
//! [lexer]
//! strict_slot_value_marker = true
//! ```

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/chatlex.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatlexConfig {
    pub lexer: LexerConfig,
}

/// Knobs of the line tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LexerConfig {
    /// Reject `=` in rules that do not belong to a slot.
    pub strict_slot_value_marker: bool,
    /// Reject rule lines with no leading whitespace.
    pub require_rule_indentation: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig {
            strict_slot_value_marker: false,
            require_rule_indentation: true,
        }
    }
}

/// File name looked up next to a template set.
pub const PROJECT_FILE: &str = "chatlex.toml";

/// Builds a [`ChatlexConfig`] from the embedded defaults plus whatever the
/// caller layers on top. Later layers win.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Loader {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    fn add_toml(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file that must exist.
    pub fn file(self, path: impl AsRef<Path>) -> Self {
        self.add_toml(path.as_ref(), true)
    }

    /// Layer a TOML file if it exists.
    pub fn optional_file(self, path: impl AsRef<Path>) -> Self {
        self.add_toml(path.as_ref(), false)
    }

    /// Layer the `chatlex.toml` of a template directory, if it has one.
    pub fn template_dir(self, dir: impl AsRef<Path>) -> Self {
        self.optional_file(dir.as_ref().join(PROJECT_FILE))
    }

    /// Set one key, e.g. `lexer.require_rule_indentation`.
    pub fn set<V>(mut self, key: &str, value: V) -> Result<Self, ConfigError>
    where
        V: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn load(self) -> Result<ChatlexConfig, ConfigError> {
        let config = self.builder.build()?.try_deserialize::<ChatlexConfig>()?;
        tracing::debug!(lexer = ?config.lexer, "loaded configuration");
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults, with nothing layered on top.
pub fn load_defaults() -> Result<ChatlexConfig, ConfigError> {
    Loader::new().load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "chatlex-config-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_match_lexer_defaults() {
        let config = load_defaults().unwrap();
        assert_eq!(config.lexer, LexerConfig::default());
    }

    #[test]
    fn test_set_overrides_one_key() {
        let config = Loader::new()
            .set("lexer.strict_slot_value_marker", true)
            .unwrap()
            .load()
            .unwrap();
        assert!(config.lexer.strict_slot_value_marker);
        assert!(config.lexer.require_rule_indentation);
    }

    #[test]
    fn test_template_dir_file_is_layered() {
        let dir = scratch_dir("project");
        fs::write(
            dir.join(PROJECT_FILE),
            "[lexer]\nrequire_rule_indentation = false\n",
        )
        .unwrap();
        let config = Loader::new().template_dir(&dir).load().unwrap();
        assert!(!config.lexer.require_rule_indentation);
        assert!(!config.lexer.strict_slot_value_marker);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_template_dir_without_file() {
        let dir = scratch_dir("bare");
        let config = Loader::new().template_dir(&dir).load().unwrap();
        assert_eq!(config.lexer, LexerConfig::default());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_files() {
        let config = Loader::new().optional_file("does/not/exist.toml").load().unwrap();
        assert_eq!(config.lexer, LexerConfig::default());
        assert!(Loader::new().file("does/not/exist.toml").load().is_err());
    }
}
