//! File context for generation requests
//!
//! Selected files are read in input-list order and folded into the final
//! user turn as labeled blocks. Reads are all-or-nothing: one unreadable
//! file aborts the whole request before any network activity, so the
//! provider never sees a partial file set.

use super::errors::GenerateError;
use std::path::PathBuf;

/// Read every file and format its labeled block
///
/// Block shape: `File: <path>\n\n<content>\n\n`, one per file, input order.
pub async fn read_file_blocks(files: &[PathBuf]) -> Result<Vec<String>, GenerateError> {
    let mut blocks = Vec::with_capacity(files.len());
    for path in files {
        let content = tokio::fs::read_to_string(path).await.map_err(|source| {
            GenerateError::FileRead {
                path: path.clone(),
                source,
            }
        })?;
        blocks.push(format!("File: {}\n\n{}\n\n", path.display(), content));
    }
    Ok(blocks)
}

/// The stanza appended to the final user turn when files are attached
pub fn file_context_stanza(blocks: &[String]) -> String {
    format!(
        "\n\nHere are the contents of the files:\n\n{}",
        blocks.join("\n")
    )
}
