//! Plans: reusable descriptions of a computational step

use crate::id::PlanId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared input, output or parameter of a plan's command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSlot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Flag emitted before the value (`--input=`, `-o `)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Positional index on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl CommandSlot {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: None,
            prefix: None,
            position: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Render `value` with this slot's prefix
    #[must_use]
    pub fn render(&self, value: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{value}"),
            None => value.to_string(),
        }
    }
}

/// Reusable step description
///
/// `command` is a template where `{slot}` placeholders name declared slots.
/// Plans are immutable once an activity references them; their lifecycle
/// belongs to a plan store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    id: PlanId,
    name: String,
    command: String,
    #[serde(default)]
    inputs: Vec<CommandSlot>,
    #[serde(default)]
    outputs: Vec<CommandSlot>,
    #[serde(default)]
    parameters: Vec<CommandSlot>,
    created_at: DateTime<Utc>,
}

impl Plan {
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: PlanId::new(),
            name: name.into(),
            command: command.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Reuse a known identifier (plans loaded from a plan store)
    #[must_use]
    pub fn with_id(mut self, id: PlanId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_input(mut self, slot: CommandSlot) -> Self {
        self.inputs.push(slot);
        self
    }

    #[must_use]
    pub fn with_output(mut self, slot: CommandSlot) -> Self {
        self.outputs.push(slot);
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, slot: CommandSlot) -> Self {
        self.parameters.push(slot);
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> PlanId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &[CommandSlot] {
        &self.inputs
    }

    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &[CommandSlot] {
        &self.outputs
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[CommandSlot] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// All slots: inputs, outputs, then parameters
    pub fn slots(&self) -> impl Iterator<Item = &CommandSlot> {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .chain(&self.parameters)
    }

    /// Render the command template with slot defaults
    ///
    /// Placeholders without a default are left as they are.
    #[must_use]
    pub fn render_command(&self) -> String {
        self.slots().fold(self.command.clone(), |rendered, slot| {
            match &slot.default_value {
                Some(value) => rendered.replace(&format!("{{{}}}", slot.name), &slot.render(value)),
                None => rendered,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_render_command_substitutes_defaults() {
        let plan = Plan::new("clean", "python clean.py {input} {output} {threshold}")
            .with_input(CommandSlot::new("input").with_default("raw.csv"))
            .with_output(CommandSlot::new("output").with_default("clean.csv").with_prefix("-o "))
            .with_parameter(CommandSlot::new("threshold"));

        assert_eq!(
            plan.render_command(),
            "python clean.py raw.csv -o clean.csv {threshold}"
        );
    }

    #[test]
    fn plan_slots_order() {
        let plan = Plan::new("p", "cmd")
            .with_parameter(CommandSlot::new("k"))
            .with_input(CommandSlot::new("i"))
            .with_output(CommandSlot::new("o"));
        let names: Vec<&str> = plan.slots().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["i", "o", "k"]);
    }

    #[test]
    fn plan_with_id_keeps_identity() {
        let id = PlanId::new();
        let plan = Plan::new("p", "cmd").with_id(id);
        assert_eq!(plan.id(), id);
    }

    #[test]
    fn plan_serde_round_trip() {
        let plan = Plan::new("p", "echo {x}").with_input(CommandSlot::new("x").with_position(1));
        let json = serde_json::to_string(&plan).unwrap();
        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }
}
