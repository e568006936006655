// src/core/watcher.rs
use crate::core::normalizer::DigitNormalizer;
use crate::dom::{MutationRecord, ObserverId, Page};
use crate::error::{NumeralError, Result};
use std::rc::Rc;

/// Attaches the normalizer to fields inserted anywhere under the body.
///
/// Nothing is watched until [`FieldWatcher::start`]; [`FieldWatcher::stop`]
/// disconnects it again.
pub struct FieldWatcher {
    normalizer: DigitNormalizer,
    observer: Option<ObserverId>,
}

impl FieldWatcher {
    pub fn new(normalizer: DigitNormalizer) -> Self {
        Self {
            normalizer,
            observer: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.observer.is_some()
    }

    pub fn start(&mut self, page: &mut Page) -> Result<()> {
        if self.observer.is_some() {
            return Err(NumeralError::WatcherAlreadyRunning);
        }
        let body = page.document().body().ok_or(NumeralError::MissingBody)?;

        let normalizer = self.normalizer.clone();
        let id = page.observe(
            body,
            true,
            Rc::new(move |page: &mut Page, records: &[MutationRecord]| {
                for record in records {
                    for &node in &record.added_nodes {
                        let attached = normalizer.scan_and_attach(page, node);
                        if attached > 0 {
                            tracing::debug!(%node, attached, "attached inserted fields");
                        }
                    }
                }
            }),
        )?;
        self.observer = Some(id);
        tracing::debug!(%body, "field watcher started");
        Ok(())
    }

    /// Returns `false` when the watcher was not running.
    pub fn stop(&mut self, page: &mut Page) -> bool {
        match self.observer.take() {
            Some(id) => {
                page.disconnect(id);
                tracing::debug!("field watcher stopped");
                true
            }
            None => false,
        }
    }
}
