use serde::Serialize;
use std::rc::Rc;

/// Resolves the node's current document offset, `None` when it is gone.
pub type PositionLookup = Rc<dyn Fn() -> Option<u32>>;

#[derive(Clone, Debug, PartialEq)]
pub enum EditorCommand {
    Focus,
    SetNodeSelection(u32),
    UpdateAttributes {
        type_name: String,
        attrs: serde_json::Value,
    },
}

/// The slice of the host rich-text editor a node view talks to.
pub trait EditorHost {
    fn is_editable(&self) -> bool;

    /// Runs a command chain as one transaction. Returns whether it applied.
    fn run(&self, commands: &[EditorCommand]) -> bool;
}

impl dyn EditorHost + '_ {
    pub fn chain(&self) -> CommandChain<'_> {
        CommandChain {
            host: self,
            commands: Vec::new(),
        }
    }
}

#[must_use = "a command chain does nothing until `run` is called"]
pub struct CommandChain<'a> {
    host: &'a dyn EditorHost,
    commands: Vec<EditorCommand>,
}

impl CommandChain<'_> {
    pub fn focus(mut self) -> Self {
        self.commands.push(EditorCommand::Focus);
        self
    }

    pub fn set_node_selection(mut self, pos: u32) -> Self {
        self.commands.push(EditorCommand::SetNodeSelection(pos));
        self
    }

    /// Queues an attribute update. Attributes that fail to serialize are
    /// queued as `null`, which hosts treat as a no-op patch.
    pub fn update_attributes(mut self, type_name: &str, attrs: &impl Serialize) -> Self {
        let attrs = serde_json::to_value(attrs).unwrap_or(serde_json::Value::Null);
        self.commands.push(EditorCommand::UpdateAttributes {
            type_name: type_name.to_string(),
            attrs,
        });
        self
    }

    pub fn commands(&self) -> &[EditorCommand] {
        &self.commands
    }

    pub fn run(self) -> bool {
        self.host.run(&self.commands)
    }
}
