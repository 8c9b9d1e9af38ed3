//! Temp-name command implementation.

use d3data_core::{generate_temp_file_name_for, Config};
use std::path::Path;

/// Runs the temp-name command.
pub fn run(dir: &Path, prefix: &str, length: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new().temp_name_random_len(length);
    let name = generate_temp_file_name_for(&config, dir, prefix)
        .ok_or_else(|| format!("no unused temporary name in {}", dir.display()))?;
    println!("{}", name.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prints_name_without_creating_file() {
        let dir = tempdir().unwrap();
        run(dir.path(), "d3", 10).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
