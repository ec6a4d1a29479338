//! Hook system: registry, dispatcher, and lifecycle event definitions.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{DispatchMode, HookPoint};
pub use dispatcher::{DispatchOutput, HookDispatcher};
pub use registry::{HookBinding, HookEntry, HookRegistry};
