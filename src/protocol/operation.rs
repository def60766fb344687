//! Outbound operations
//!
//! `{"run":{"actions":[{"action":"Key","args":["a"]}]}}` is the only shape
//! the input path produces; the pass-through replies are here so callers
//! answering a `passthru` indication have something to send.

use serde::{Deserialize, Serialize};

/// One host action with string arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub action: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Action {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(action: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: action.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Run a batch of actions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Run {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_tag: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    pub actions: Vec<Action>,
}

/// Register a pass-through action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Register {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_params: Option<String>,
}

/// Completes a pass-through action, successfully or not
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PassthruResult {
    pub p_tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
}

/// A message sent to the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Run(Run),
    Register(Register),
    Fail(PassthruResult),
    Succeed(PassthruResult),
}

impl Operation {
    /// An untagged run of the given actions
    pub fn run(actions: Vec<Action>) -> Self {
        Operation::Run(Run {
            r_tag: None,
            type_: None,
            actions,
        })
    }

    /// Serialize for the wire
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_run() {
        let op = Operation::run(vec![Action::with_args("Key", ["a"])]);
        assert_eq!(
            op.encode().unwrap(),
            r#"{"run":{"actions":[{"action":"Key","args":["a"]}]}}"#
        );
    }

    #[test]
    fn test_encode_run_without_args() {
        let op = Operation::run(vec![Action::new("Enter")]);
        assert_eq!(
            op.encode().unwrap(),
            r#"{"run":{"actions":[{"action":"Enter","args":[]}]}}"#
        );
    }

    #[test]
    fn test_encode_passthru_reply() {
        let op = Operation::Fail(PassthruResult {
            p_tag: "p7".to_string(),
            text: vec!["no such file".to_string()],
        });
        assert_eq!(
            op.encode().unwrap(),
            r#"{"fail":{"p-tag":"p7","text":["no such file"]}}"#
        );
    }

    #[test]
    fn test_decode_action_defaults_args() {
        let action: Action = serde_json::from_str(r#"{"action":"Attn"}"#).unwrap();
        assert_eq!(action, Action::new("Attn"));
    }
}
