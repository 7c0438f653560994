//! Shell configuration.
//!
//! Every key is optional; a missing key keeps its default. Unknown keys are
//! rejected so typos surface at load time instead of being silently ignored.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

/// Placeholder replaced by the flag token in `missing_param_message`.
pub const FLAG_PLACEHOLDER: &str = "{flag}";

/// Placeholder replaced by the parameter name in `missing_param_message`.
pub const PARAM_PLACEHOLDER: &str = "{param}";

/// Recognized options for a shell instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Seconds between dispatch ticks.
    pub poll_period_secs: f64,
    /// Banner printed once when the shell starts.
    pub start_message: String,
    /// Prompt printed (followed by a space) before each read.
    pub input_prefix: String,
    /// Reply when no command matches the leading token.
    pub no_command_message: String,
    /// Reply template when a parameter flag has no value.
    /// `{flag}` and `{param}` are substituted.
    pub missing_param_message: String,
    /// Print the banner and prompts.
    pub echo: bool,
    /// Print the error chain after the apology when a handler fails.
    pub print_stack_trace: bool,
    /// Register the demo arithmetic commands.
    pub demo_commands: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            poll_period_secs: 1.0,
            start_message: "Please enter a command! (Type helpf to access the help command)"
                .to_string(),
            input_prefix: "$".to_string(),
            no_command_message: "There is no command matching that name! \
                                 Use the command help to return the help message!"
                .to_string(),
            missing_param_message: "You must provide a {param} for the flag {flag}!".to_string(),
            echo: true,
            print_stack_trace: true,
            demo_commands: false,
        }
    }
}

impl ShellConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
            .map_err(|e| ShellError::Config(format!("{}: {e}", path.display())))
    }

    /// Check values that serde alone cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if !self.poll_period_secs.is_finite() || self.poll_period_secs < 0.0 {
            return Err(ShellError::Config(format!(
                "poll_period_secs must be a non-negative number, got {}",
                self.poll_period_secs
            )));
        }
        Ok(())
    }

    /// Tick period as a `Duration`. Invalid values fall back to zero.
    pub fn poll_period(&self) -> Duration {
        Duration::try_from_secs_f64(self.poll_period_secs).unwrap_or(Duration::ZERO)
    }

    /// Render the missing-parameter template for `flag` and its placeholder.
    pub fn missing_param(&self, flag: &str, param: &str) -> String {
        self.missing_param_message
            .replace(FLAG_PLACEHOLDER, flag)
            .replace(PARAM_PLACEHOLDER, param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ShellConfig::default();
        assert_eq!(c.poll_period(), Duration::from_secs(1));
        assert_eq!(c.input_prefix, "$");
        assert!(c.echo);
        assert!(c.print_stack_trace);
        assert!(!c.demo_commands);
    }

    #[test]
    fn empty_toml_is_default() {
        let c = ShellConfig::from_toml_str("").unwrap();
        assert_eq!(c, ShellConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let c = ShellConfig::from_toml_str(
            r#"
poll_period_secs = 0.25
input_prefix = ">"
demo_commands = true
"#,
        )
        .unwrap();
        assert_eq!(c.poll_period(), Duration::from_millis(250));
        assert_eq!(c.input_prefix, ">");
        assert!(c.demo_commands);
        assert_eq!(c.start_message, ShellConfig::default().start_message);
    }

    #[test]
    fn unknown_key_rejected() {
        let err = ShellConfig::from_toml_str("prompt = \"#\"").unwrap_err();
        assert!(matches!(err, ShellError::TomlParse(_)));
    }

    #[test]
    fn negative_period_rejected() {
        let err = ShellConfig::from_toml_str("poll_period_secs = -1.0").unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }

    #[test]
    fn missing_param_template() {
        let c = ShellConfig::default();
        assert_eq!(
            c.missing_param("-s", "[status]"),
            "You must provide a [status] for the flag -s!"
        );
    }

    #[test]
    fn custom_missing_param_template() {
        let c = ShellConfig {
            missing_param_message: "{flag} needs {param}".to_string(),
            ..ShellConfig::default()
        };
        assert_eq!(c.missing_param("-o", "file"), "-o needs file");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdloop.toml");
        std::fs::write(&path, "echo = false\n").unwrap();
        let c = ShellConfig::load(&path).unwrap();
        assert!(!c.echo);
    }

    #[test]
    fn load_reports_path_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "poll_period_secs = \"fast\"\n").unwrap();
        match ShellConfig::load(&path).unwrap_err() {
            ShellError::Config(msg) => assert!(msg.contains("bad.toml")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ShellConfig::load("/nonexistent/cmdloop.toml").unwrap_err();
        assert!(matches!(err, ShellError::Io(_)));
    }
}
