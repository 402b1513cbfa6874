//! Shared store for menu label text.
//!
//! Handlers on any thread write through `LabelSink`; the UI thread copies
//! changed text into its menu tree before drawing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::types::LabelSink;

#[derive(Debug, Default)]
pub struct LabelBoard {
    labels: RwLock<HashMap<(String, String), String>>,
    revision: AtomicU64,
}

impl LabelBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of a label, if any handler has written it.
    pub fn get(&self, menu: &str, name: &str) -> Option<String> {
        let labels = self.labels.read().ok()?;
        labels.get(&(menu.to_string(), name.to_string())).cloned()
    }

    /// Bumped on every write.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Every label as `(menu, name, text)`.
    pub fn snapshot(&self) -> Vec<(String, String, String)> {
        match self.labels.read() {
            Ok(labels) => labels
                .iter()
                .map(|((menu, name), text)| (menu.clone(), name.clone(), text.clone()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl LabelSink for LabelBoard {
    fn update_label(&self, menu: &str, name: &str, text: &str) {
        log::debug!(target: "ui::labels", "{}/{} = {:?}", menu, name, text);
        if let Ok(mut labels) = self.labels.write() {
            labels.insert((menu.to_string(), name.to_string()), text.to_string());
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
    }
}
