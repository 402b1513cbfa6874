//! Dispatch abstraction and the narrow capabilities handed to handlers.

use crate::Action;

/// Trait for routing actions to their handlers.
///
/// Implementations are called from the UI thread, the MIDI callback thread
/// and the OSC listener thread at the same time, so they take `&self`.
pub trait Dispatcher: Send + Sync {
    /// Route an action to its handler. Failures are handled inside.
    fn dispatch(&self, action: Action);
}

/// Ask the application to tear down and exit.
pub trait Shutdownable: Send + Sync {
    fn request_shutdown(&self);
}

/// Suspend or resume translation of foot-controller messages.
pub trait MidiInputControl: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn is_enabled(&self) -> bool;
}

/// Write access to menu labels (`lbl_*` items).
pub trait LabelSink: Send + Sync {
    fn update_label(&self, menu: &str, name: &str, text: &str);
}
