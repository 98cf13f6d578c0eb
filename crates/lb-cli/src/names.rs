//! Candidate name lists: a JSON array of package-name strings.

use std::path::Path;

use anyhow::Context;

pub fn read_name_list(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read name list {}", path.display()))?;
    let names: Vec<String> = serde_json::from_str(&raw).with_context(|| {
        format!(
            "name list {} is not a JSON array of strings",
            path.display()
        )
    })?;
    tracing::debug!(path = %path.display(), count = names.len(), "name list loaded");
    Ok(names)
}
