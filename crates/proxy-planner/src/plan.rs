//! Action plan types
//!
//! A plan is a flat list of steps rendered one per line. Comment and blank
//! lines are real steps: operators follow them to pace the rollout.

use serde::Serialize;
use std::fmt;

/// One line of the action plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionStep {
    /// A command for the operator to run
    Shell {
        /// Command line
        command: String,
    },
    /// An environment variable assignment
    Env {
        /// Variable name
        name: String,
        /// Variable value
        value: String,
    },
    /// An instruction for the operator
    Comment {
        /// Comment text, without the leading `#`
        text: String,
    },
    /// A separator between groups of steps
    Blank,
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStep::Shell { command } => f.write_str(command),
            ActionStep::Env { name, value } => write!(f, "export {name}={value}"),
            ActionStep::Comment { text } => write!(f, "# {text}"),
            ActionStep::Blank => Ok(()),
        }
    }
}

/// Ordered list of steps produced by the plan builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionPlan {
    steps: Vec<ActionStep>,
}

impl ActionPlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn shell(&mut self, command: impl Into<String>) -> &mut Self {
        self.push(ActionStep::Shell {
            command: command.into(),
        })
    }

    /// Append an environment variable assignment
    pub fn env(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(ActionStep::Env {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Append a comment
    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(ActionStep::Comment { text: text.into() })
    }

    /// Append a blank separator
    pub fn blank(&mut self) -> &mut Self {
        self.push(ActionStep::Blank)
    }

    /// Append any step
    pub fn push(&mut self, step: ActionStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Steps in order
    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the plan as newline separated lines
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Render the plan as a JSON array of steps
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ActionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
