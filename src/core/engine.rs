use crate::config::NormalizerConfig;
use crate::core::normalizer::DigitNormalizer;
use crate::core::types::{EventKind, ReadyState};
use crate::core::watcher::FieldWatcher;
use crate::dom::{Event, Page};
use crate::error::Result;
use crate::persistence::{load_config, save_config};
use std::path::{Path, PathBuf};
use std::rc::Rc;

// The engine ties config, normalizer and watcher together for one page.
pub struct NumeralEngine {
    config: NormalizerConfig,
    normalizer: DigitNormalizer,
    watcher: FieldWatcher,
    config_path: Option<PathBuf>,
}

impl NumeralEngine {
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        let normalizer = DigitNormalizer::from_config(&config)?;
        Ok(Self {
            watcher: FieldWatcher::new(normalizer.clone()),
            normalizer,
            config,
            config_path: None,
        })
    }

    /// Loads the config at `path`, falling back to defaults when it is
    /// missing or unusable. Only a config that loaded cleanly remembers its
    /// path, so `save_config` never replaces a file with the fallback.
    pub fn from_file_or_default(path: &str) -> Self {
        let loaded = load_config(Path::new(path)).and_then(Self::new);
        match loaded {
            Ok(mut engine) => {
                engine.config_path = Some(PathBuf::from(path));
                engine
            }
            Err(e) => {
                tracing::warn!("using default config, could not load '{}': {}", path, e);
                Self::with_defaults()
            }
        }
    }

    fn with_defaults() -> Self {
        let config = NormalizerConfig::default();
        let normalizer = DigitNormalizer::new(
            config.selector_set().unwrap_or_default(),
            config.paste_delay(),
            &config.marker_attribute,
        );
        Self {
            watcher: FieldWatcher::new(normalizer.clone()),
            normalizer,
            config,
            config_path: None,
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &DigitNormalizer {
        &self.normalizer
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_running()
    }

    /// Starts the watcher and attaches to every field already on the page.
    /// While the document is still loading the initial scan waits for
    /// `DOMContentLoaded`.
    pub fn install(&mut self, page: &mut Page) -> Result<()> {
        self.watcher.start(page)?;

        if page.document().ready_state() == ReadyState::Loading {
            let normalizer = self.normalizer.clone();
            page.add_document_listener(
                EventKind::DomContentLoaded,
                Rc::new(move |page: &mut Page, _: &Event| initial_scan(&normalizer, page)),
            );
        } else {
            initial_scan(&self.normalizer, page);
        }
        Ok(())
    }

    pub fn shutdown(&mut self, page: &mut Page) -> bool {
        self.watcher.stop(page)
    }

    pub fn save_config(&self) -> Result<()> {
        match &self.config_path {
            Some(path) => save_config(&self.config, path),
            None => Ok(()), // Don't error if no path is set
        }
    }
}

fn initial_scan(normalizer: &DigitNormalizer, page: &mut Page) {
    let root = page.document().root();
    let attached = normalizer.scan_and_attach(page, root);
    tracing::info!("Arabic number converter initialized for {} inputs", attached);
}
