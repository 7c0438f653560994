//! Line parser: splits a raw input line into flags, flag values, and
//! positional arguments according to a command's [`FlagSpec`].
//!
//! Tokens are separated by single spaces. There is no quoting or escaping, so
//! a value can never contain a space. Flag matching is exact and
//! case-sensitive; the invocation token is matched case-insensitively, the same
//! way the registry resolved it.

use std::collections::BTreeMap;

use serde::Serialize;

use cmdloop_types::error::Result;

use crate::flags::FlagSpec;

/// A parameter flag that appeared without a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingParam {
    pub flag: String,
    pub placeholder: String,
}

/// Structured view of one dispatched line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedInput {
    raw: String,
    no_param_flags: Vec<String>,
    /// `None` when any present parameter flag lacked a value.
    param_flags: Option<BTreeMap<String, String>>,
    missing: Option<MissingParam>,
    positional: String,
}

impl ParsedInput {
    /// The full line as dispatched.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// No-parameter flags present in the line, in line order.
    pub fn no_param_flags(&self) -> &[String] {
        &self.no_param_flags
    }

    /// Matched parameter flags and their values.
    ///
    /// Returns `None` if a parameter flag in the line was last, or was
    /// followed by another flag of the same command. Handlers must check
    /// this before reading values.
    pub fn param_flags(&self) -> Option<&BTreeMap<String, String>> {
        self.param_flags.as_ref()
    }

    /// Value of a matched parameter flag.
    pub fn param(&self, flag: &str) -> Option<&str> {
        self.param_flags
            .as_ref()
            .and_then(|m| m.get(flag))
            .map(String::as_str)
    }

    /// The first parameter flag that lacked a value, if parsing failed.
    pub fn missing_param(&self) -> Option<&MissingParam> {
        self.missing.as_ref()
    }

    /// Present switches followed by matched parameter flags.
    pub fn all_flags(&self) -> Vec<&str> {
        let matched = self.param_flags.iter().flat_map(|m| m.keys());
        self.no_param_flags
            .iter()
            .chain(matched)
            .map(String::as_str)
            .collect()
    }

    /// `true` if `flag` is a present switch or a matched parameter flag.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.no_param_flags.iter().any(|f| f == flag) || self.param(flag).is_some()
    }

    /// Residual text after removing the invocation token and all matched
    /// flags and values. Never absent; empty when nothing remains.
    pub fn positional(&self) -> &str {
        &self.positional
    }

    /// Positional arguments split on whitespace.
    pub fn args(&self) -> Vec<&str> {
        self.positional.split_whitespace().collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parse `line` for a command invoked by one of `names`.
///
/// Every occurrence of a parameter flag is checked: the last value wins and
/// any occurrence without a value puts the result in the error state.
/// Removal of flags and values from the positional text works on token
/// positions, so a value that also appears elsewhere in the line only loses
/// the matched occurrence.
pub fn parse(line: &str, spec: &FlagSpec, names: &[&str]) -> ParsedInput {
    let tokens: Vec<&str> = line.split(' ').collect();
    let mut consumed = vec![false; tokens.len()];

    let start = match tokens.first() {
        Some(first) if names.iter().any(|n| n.eq_ignore_ascii_case(first)) => {
            consumed[0] = true;
            1
        },
        _ => 0,
    };

    let mut no_param_flags = Vec::new();
    for (i, token) in tokens.iter().enumerate().skip(start) {
        if spec.is_switch(token) {
            no_param_flags.push((*token).to_string());
            consumed[i] = true;
        }
    }

    let mut matched = BTreeMap::new();
    let mut missing = None;
    for param in spec.param_flags() {
        let positions: Vec<usize> = (start..tokens.len())
            .filter(|&i| tokens[i] == param.flag)
            .collect();
        for i in positions {
            consumed[i] = true;
            match tokens.get(i + 1) {
                Some(value) if !value.is_empty() && !spec.is_known(value) => {
                    matched.insert(param.flag.clone(), (*value).to_string());
                    consumed[i + 1] = true;
                },
                _ => {
                    if missing.is_none() {
                        missing = Some(MissingParam {
                            flag: param.flag.clone(),
                            placeholder: param.placeholder.clone(),
                        });
                    }
                },
            }
        }
    }

    let positional = tokens
        .iter()
        .zip(&consumed)
        .filter(|(_, used)| !**used)
        .map(|(t, _)| *t)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let param_flags = if missing.is_some() {
        None
    } else {
        Some(matched)
    };

    ParsedInput {
        raw: line.to_string(),
        no_param_flags,
        param_flags,
        missing,
        positional,
    }
}
