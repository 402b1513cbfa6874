//! System menu: quit the application or power the device off.

use std::sync::Arc;

use crate::tools::run_tool;
use crate::types::Shutdownable;

pub struct SystemControl {
    shutdown: Arc<dyn Shutdownable>,
}

impl SystemControl {
    pub fn new(shutdown: Arc<dyn Shutdownable>) -> Self {
        Self { shutdown }
    }

    pub fn shutdown(&self) {
        log::info!(target: "system", "shutdown requested");
        self.shutdown.request_shutdown();
    }

    /// Request application shutdown, then power the device off.
    pub fn poweroff(&self) {
        log::warn!(target: "system", "powering off");
        self.shutdown.request_shutdown();
        if let Err(e) = run_tool("sudo", &["poweroff"]) {
            log::error!(target: "system", "poweroff failed: {}", e);
        }
    }
}
