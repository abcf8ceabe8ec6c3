//! Seams onto the host's command and event systems.

use crate::capability::{CommandNode, Listener};
use crate::error::HostError;

/// The host's command registrar.
pub trait CommandRegistrar {
    fn register(
        &mut self,
        node: CommandNode,
        description: String,
        aliases: Vec<String>,
    ) -> Result<(), HostError>;
}

/// The host's event system.
pub trait EventRegistrar {
    fn register_listener(&mut self, listener: Box<dyn Listener>) -> Result<(), HostError>;
}
