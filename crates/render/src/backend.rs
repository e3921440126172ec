use crate::frame::{Command, DrawCall};

/// The opaque consumer of a sorted command + drawcall stream.
///
/// A real implementation owns the actual graphics API calls; this crate
/// only guarantees the order in which `process_command`/`process_drawcall`
/// are invoked, never how they're implemented.
pub trait Backend {
    fn process_command(&mut self, command: &Command);
    fn process_drawcall(&mut self, drawcall: &DrawCall);
}
