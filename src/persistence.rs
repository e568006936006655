// File: src/persistence.rs
use crate::config::NormalizerConfig;
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes the config as pretty JSON. The file is replaced atomically, so a
/// reader never sees a half-written config.
pub fn save_config(config: &NormalizerConfig, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, config)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<NormalizerConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: NormalizerConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}
