//! Per-command flag declarations.

use serde::Serialize;

use cmdloop_types::error::{Result, ShellError};

/// A flag that must be followed by exactly one value token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamFlag {
    /// The flag token, e.g. `-s`.
    pub flag: String,
    /// Human-readable name of the value, e.g. `[status]`.
    pub placeholder: String,
}

/// Which tokens a command treats as flags.
///
/// No-parameter flags are boolean switches. Parameter flags take the token
/// right after them as their value. Declaration order only matters for help
/// listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagSpec {
    no_param: Vec<String>,
    param: Vec<ParamFlag>,
}

impl FlagSpec {
    /// A spec with no flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a no-parameter flag.
    pub fn switch(mut self, flag: impl Into<String>) -> Self {
        self.no_param.push(flag.into());
        self
    }

    /// Declare a parameter flag with its placeholder name.
    pub fn param(mut self, flag: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.param.push(ParamFlag {
            flag: flag.into(),
            placeholder: placeholder.into(),
        });
        self
    }

    pub fn no_param_flags(&self) -> &[String] {
        &self.no_param
    }

    pub fn param_flags(&self) -> &[ParamFlag] {
        &self.param
    }

    pub fn is_empty(&self) -> bool {
        self.no_param.is_empty() && self.param.is_empty()
    }

    /// `true` if `token` is a declared no-parameter flag.
    pub fn is_switch(&self, token: &str) -> bool {
        self.no_param.iter().any(|f| f == token)
    }

    /// `true` if `token` is any flag this spec declares.
    pub fn is_known(&self, token: &str) -> bool {
        self.is_switch(token) || self.param.iter().any(|p| p.flag == token)
    }

    /// Placeholder name of a parameter flag.
    pub fn placeholder(&self, flag: &str) -> Option<&str> {
        self.param
            .iter()
            .find(|p| p.flag == flag)
            .map(|p| p.placeholder.as_str())
    }

    /// Reject empty, whitespace-bearing, duplicated, or doubly-declared tokens.
    pub fn validate(&self) -> Result<()> {
        let all = self
            .no_param
            .iter()
            .chain(self.param.iter().map(|p| &p.flag));
        let mut seen: Vec<&str> = Vec::new();
        for flag in all {
            if flag.is_empty() || flag.contains(char::is_whitespace) {
                return Err(ShellError::Config(format!(
                    "invalid flag token '{flag}'"
                )));
            }
            if seen.contains(&flag.as_str()) {
                return Err(ShellError::Config(format!(
                    "flag '{flag}' is declared more than once"
                )));
            }
            seen.push(flag);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec() {
        let spec = FlagSpec::new();
        assert!(spec.is_empty());
        assert!(!spec.is_known("-h"));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn switches_and_params_are_known() {
        let spec = FlagSpec::new().switch("-h").param("-s", "[status]");
        assert!(spec.is_switch("-h"));
        assert!(!spec.is_switch("-s"));
        assert!(spec.is_known("-h"));
        assert!(spec.is_known("-s"));
        assert!(!spec.is_known("-x"));
        assert_eq!(spec.placeholder("-s"), Some("[status]"));
        assert_eq!(spec.placeholder("-h"), None);
    }

    #[test]
    fn declaration_order_kept() {
        let spec = FlagSpec::new()
            .switch("-b")
            .switch("-a")
            .param("-z", "zed")
            .param("-y", "why");
        assert_eq!(spec.no_param_flags(), ["-b", "-a"]);
        let params: Vec<&str> = spec.param_flags().iter().map(|p| p.flag.as_str()).collect();
        assert_eq!(params, ["-z", "-y"]);
    }

    #[test]
    fn flag_matching_is_case_sensitive() {
        let spec = FlagSpec::new().switch("-v");
        assert!(!spec.is_switch("-V"));
    }

    #[test]
    fn same_token_in_both_lists_rejected() {
        let spec = FlagSpec::new().switch("-s").param("-s", "[status]");
        assert!(matches!(spec.validate(), Err(ShellError::Config(_))));
    }

    #[test]
    fn duplicate_switch_rejected() {
        let spec = FlagSpec::new().switch("-q").switch("-q");
        assert!(spec.validate().is_err());
    }

    #[test]
    fn whitespace_in_flag_rejected() {
        let spec = FlagSpec::new().param("-o x", "file");
        assert!(spec.validate().is_err());
        assert!(FlagSpec::new().switch("").validate().is_err());
    }
}
