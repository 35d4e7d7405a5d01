//! Pipeline output sink (the file named by `GITHUB_OUTPUT`).

use crate::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Pick a heredoc delimiter that does not appear as a line of `value`.
fn delimiter_for(value: &str) -> String {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut n = seed;
    loop {
        let delim = format!("EOF_{:x}", n);
        if !value.lines().any(|line| line == delim) {
            return delim;
        }
        n = n.wrapping_add(1);
    }
}

/// Render a multi-line `key<<DELIM ... DELIM` block.
pub fn render_block(key: &str, value: &str) -> String {
    let delim = delimiter_for(value);
    format!("{key}<<{delim}\n{value}\n{delim}\n")
}

/// Append `key` = `value` to the pipeline output file.
pub fn append(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(render_block(key, value).as_bytes())?;
    info!("Wrote '{}' to {}", key, path.display());
    Ok(())
}
