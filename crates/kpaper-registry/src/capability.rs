//! Extension capabilities and the contracts plugin classes implement.

use std::fmt;
use std::str::FromStr;

/// Separator the host uses in binary names of nested types.
pub const NESTED_SEPARATOR: char = '$';

/// The kinds of extension point the bootstrapper registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Command,
    Listener,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Command, Capability::Listener];

    /// Keyword used in the registry manifest.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Listener => "listener",
        }
    }

    /// Subpackage of the base package holding candidates.
    pub fn package_suffix(&self) -> &'static str {
        match self {
            Self::Command => "commands",
            Self::Listener => "listeners",
        }
    }

    /// Simple name of the supertype a candidate must declare.
    pub fn supertype(&self) -> &'static str {
        match self {
            Self::Command => "CommandBuilder",
            Self::Listener => "Listener",
        }
    }

    /// Fully-qualified candidate package under `base_package`.
    pub fn package(&self, base_package: &str) -> String {
        format!("{base_package}.{}", self.package_suffix())
    }

    /// Whether `class_name` lives in this capability's package under
    /// `base_package` or one of its subpackages.
    ///
    /// `<base>.commands.Ping` and `<base>.commands.admin.Ban` match;
    /// `<base>.commandsExtra.Foo` does not.
    pub fn covers(&self, base_package: &str, class_name: &str) -> bool {
        let Some((package, _)) = class_name.rsplit_once('.') else {
            return false;
        };
        is_within(package, &self.package(base_package))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "command" => Ok(Self::Command),
            "listener" => Ok(Self::Listener),
            other => Err(format!("unknown capability '{other}'")),
        }
    }
}

/// `package` equals `parent` or is a subpackage of it.
pub(crate) fn is_within(package: &str, parent: &str) -> bool {
    package == parent
        || package
            .strip_prefix(parent)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// A class that declares one capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionCandidate {
    pub class_name: String,
    pub capability: Capability,
}

impl ExtensionCandidate {
    pub fn new(class_name: impl Into<String>, capability: Capability) -> Self {
        Self {
            class_name: class_name.into(),
            capability,
        }
    }

    /// Class name without its package.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.class_name)
    }
}

pub(crate) fn simple_name(class_name: &str) -> &str {
    class_name
        .rsplit_once('.')
        .map_or(class_name, |(_, simple)| simple)
}

/// A node of a command tree handed to the host's command registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    pub literal: String,
    pub children: Vec<CommandNode>,
}

impl CommandNode {
    pub fn literal(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A class that contributes a command.
pub trait CommandBuilder: Send {
    /// Build the command tree to register.
    fn register(&self) -> CommandNode;

    fn description(&self) -> String {
        String::new()
    }

    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A class that handles host events.
pub trait Listener: Send {
    /// Display name used in logs.
    fn name(&self) -> String;

    /// Event types this listener subscribes to.
    fn events(&self) -> Vec<String>;
}

/// A freshly instantiated extension class.
///
/// The capability checks consume the instance; an instance that satisfies
/// neither returns `None` from both.
pub trait Extension: Send {
    fn into_command(self: Box<Self>) -> Option<Box<dyn CommandBuilder>> {
        None
    }

    fn into_listener(self: Box<Self>) -> Option<Box<dyn Listener>> {
        None
    }
}
