//! List command implementation.

use d3data_core::{collect_matching_files, FilePattern};
use std::path::Path;

/// Runs the list command.
pub fn run(
    dir: &Path,
    pattern: Option<&str>,
    glob: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pattern = match (pattern, glob) {
        (Some(regex), _) => FilePattern::regex(regex)?,
        (None, Some(glob)) => FilePattern::glob(glob)?,
        (None, None) => return Err("either --pattern or --glob is required".into()),
    };

    let mut files = collect_matching_files(dir, &pattern);
    files.sort();
    for file in &files {
        println!("{}", file.display());
    }

    Ok(())
}
