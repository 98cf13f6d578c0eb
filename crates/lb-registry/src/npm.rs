//! npm registry metadata fetch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lb_core::upstream::RegistryMetadata;
use serde_json::Value;

use crate::error::RegistryError;
use crate::http::{check_response, read_json};
use crate::{UpstreamClient, encode_name};

/// The parts of a registry document ("packument") the leaderboard reads.
///
/// Version blocks and the `time` map stay loosely typed: old packages carry
/// odd shapes there (array dependencies, an `unpublished` object) that must
/// not fail the whole document.
#[derive(serde::Deserialize)]
struct Packument {
    #[serde(default)]
    description: Option<Value>,
    #[serde(default, rename = "dist-tags")]
    dist_tags: HashMap<String, Value>,
    #[serde(default)]
    versions: Option<HashMap<String, Value>>,
    #[serde(default)]
    time: HashMap<String, Value>,
}

/// Sorted key set of an object-valued field of a version block.
fn dependency_names(version: &Value, field: &str) -> Vec<String> {
    let mut names: Vec<String> = version
        .get(field)
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

fn timestamp(time: &HashMap<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = time.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn into_metadata(name: &str, doc: Packument) -> Result<RegistryMetadata, RegistryError> {
    let no_version = || RegistryError::NoVersionInfo {
        package: name.to_string(),
    };

    let latest = doc
        .dist_tags
        .get("latest")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(no_version)?
        .to_string();
    let version = doc
        .versions
        .as_ref()
        .and_then(|versions| versions.get(&latest))
        .ok_or_else(no_version)?;

    Ok(RegistryMetadata {
        dependencies: dependency_names(version, "dependencies"),
        peer_dependencies: dependency_names(version, "peerDependencies"),
        description: doc
            .description
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        created_at: timestamp(&doc.time, "created"),
        modified_at: timestamp(&doc.time, "modified"),
        latest_version: latest,
    })
}

impl UpstreamClient {
    /// Fetch the registry entry for `name` and resolve its latest version.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NoVersionInfo`] when the `latest` tag or its
    /// version block is missing, and other [`RegistryError`] variants for
    /// transport failures, non-success statuses or undecodable bodies.
    pub async fn fetch_metadata(&self, name: &str) -> Result<RegistryMetadata, RegistryError> {
        let url = format!("{}/{}", self.registry_url, encode_name(name));
        let doc: Packument = self
            .retry
            .run("registry", || async {
                let resp = check_response(self.http.get(&url).send().await?).await?;
                read_json::<Packument>(resp).await
            })
            .await?;
        into_metadata(name, doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "name": "react-dom",
        "description": "React package for working with the DOM.",
        "dist-tags": { "latest": "18.3.1", "next": "19.0.0-rc" },
        "versions": {
            "18.2.0": { "dependencies": { "old-dep": "^1.0.0" } },
            "18.3.1": {
                "dependencies": { "scheduler": "^0.23.2", "loose-envify": "^1.1.0" },
                "peerDependencies": { "react": "^18.3.1" }
            }
        },
        "time": {
            "created": "2011-10-26T17:46:21.942Z",
            "modified": "2024-04-26T16:42:37.113Z",
            "18.3.1": "2024-04-26T16:42:36.000Z"
        }
    }"#;

    fn parse(json: &str) -> Packument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn resolves_latest_version_block() {
        let meta = into_metadata("react-dom", parse(FIXTURE)).unwrap();
        assert_eq!(meta.latest_version, "18.3.1");
        assert_eq!(meta.description, "React package for working with the DOM.");
        assert_eq!(
            meta.dependencies,
            vec!["loose-envify".to_string(), "scheduler".to_string()]
        );
        assert_eq!(meta.peer_dependencies, vec!["react".to_string()]);
        assert_eq!(
            meta.created_at.map(|t| t.to_rfc3339()),
            Some("2011-10-26T17:46:21.942+00:00".to_string())
        );
        assert!(meta.modified_at.is_some());
    }

    #[test]
    fn missing_latest_tag_is_no_version_info() {
        let doc = parse(r#"{ "dist-tags": {}, "versions": { "1.0.0": {} } }"#);
        let err = into_metadata("ghost", doc).unwrap_err();
        assert!(matches!(err, RegistryError::NoVersionInfo { package } if package == "ghost"));
    }

    #[test]
    fn missing_versions_is_no_version_info() {
        let doc = parse(r#"{ "dist-tags": { "latest": "1.0.0" } }"#);
        assert!(matches!(
            into_metadata("ghost", doc),
            Err(RegistryError::NoVersionInfo { .. })
        ));
    }

    #[test]
    fn latest_pointing_at_unknown_version_is_no_version_info() {
        let doc = parse(r#"{ "dist-tags": { "latest": "2.0.0" }, "versions": { "1.0.0": {} } }"#);
        assert!(matches!(
            into_metadata("ghost", doc),
            Err(RegistryError::NoVersionInfo { .. })
        ));
    }

    #[test]
    fn odd_shapes_degrade_to_defaults() {
        let doc = parse(
            r#"{
                "description": null,
                "dist-tags": { "latest": "0.0.1" },
                "versions": { "0.0.1": { "dependencies": ["legacy-array-form"] } },
                "time": { "created": "not a date", "unpublished": { "time": "2020-01-01" } }
            }"#,
        );
        let meta = into_metadata("legacy", doc).unwrap();
        assert_eq!(meta.description, "");
        assert!(meta.dependencies.is_empty());
        assert!(meta.peer_dependencies.is_empty());
        assert!(meta.created_at.is_none());
        assert!(meta.modified_at.is_none());
    }
}
