use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::DEFAULT_CONFIG;
use crate::error::{Error, Result};

/// Writes the default configuration to `destination`. An existing file is
/// left untouched and reported as an error.
pub fn install_config(destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::storage(parent, e))?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| Error::storage(destination, e))?;
    file.write_all(DEFAULT_CONFIG.as_bytes())
        .map_err(|e| Error::storage(destination, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_once_and_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("energymon-install-{}", std::process::id()));
        let path = dir.join("nested").join("energymon.yml");
        let _ = fs::remove_dir_all(&dir);

        install_config(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
        assert!(matches!(install_config(&path), Err(Error::Storage { .. })));

        fs::remove_dir_all(&dir).unwrap();
    }
}
