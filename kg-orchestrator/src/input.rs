//! Workflow input validation and website-id derivation (spec §4.1 step 1,
//! §6 "Workflow input").

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Credentials handed to the site crawler / URL exploration phase for
/// authenticated sites.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub login_url: Option<String>,
}

/// `options{...}` (spec §6 workflow input).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkflowOptions {
    #[serde(default)]
    pub max_pages: Option<u32>,
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub website_urls: Option<Vec<String>>,
    #[serde(default)]
    pub exploration_max_pages: Option<u32>,
    #[serde(default)]
    pub exploration_max_depth: Option<u32>,
    #[serde(default)]
    pub extract_thumbnails: bool,
}

/// `{job_id, knowledge_id, source_type?, source_url?, source_urls[]?,
/// source_name?, source_names[]?, options{...}}` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub job_id: String,
    pub knowledge_id: String,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_urls: Option<Vec<String>>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub source_names: Option<Vec<String>>,
    #[serde(default)]
    pub options: WorkflowOptions,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("exactly one of source_url or source_urls is required")]
    AmbiguousOrMissingSource,
    #[error("source_urls and source_names have different lengths")]
    SourceNameCountMismatch,
}

/// A validated `(url_or_path, name, type?)` tuple ready to hand to the
/// ingestion router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceTuple {
    pub url_or_path: String,
    pub name: String,
    #[serde(default)]
    pub source_type: Option<String>,
}

impl WorkflowInput {
    /// Validates that exactly one of `source_url`/`source_urls` is present
    /// and expands the input into one `SourceTuple` per source (spec §6:
    /// "Exactly one of source_url or source_urls is required").
    pub fn validate(&self) -> Result<Vec<SourceTuple>, InputError> {
        match (&self.source_url, &self.source_urls) {
            (Some(_), Some(_)) | (None, None) => return Err(InputError::AmbiguousOrMissingSource),
            _ => {}
        }

        if let Some(url) = &self.source_url {
            let name = self.source_name.clone().unwrap_or_else(|| url.clone());
            return Ok(vec![SourceTuple { url_or_path: url.clone(), name, source_type: self.source_type.clone() }]);
        }

        let urls = self.source_urls.as_ref().expect("validated above");
        let names = match &self.source_names {
            Some(names) if names.len() == urls.len() => names.clone(),
            Some(_) => return Err(InputError::SourceNameCountMismatch),
            None => urls.clone(),
        };

        Ok(urls
            .iter()
            .zip(names)
            .map(|(url, name)| SourceTuple { url_or_path: url.clone(), name, source_type: self.source_type.clone() })
            .collect())
    }
}

/// Host of a `scheme://host[:port]/...` URL, or `None` for a bare file path
/// (no host component to derive a website id from).
fn url_host(url_or_path: &str) -> Option<String> {
    let after_scheme = url_or_path.split_once("://")?.1;
    let host = after_scheme.split(['/', '?', '#']).next().unwrap_or(after_scheme);
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// Derives `website_id` from the source set: the single common host if every
/// source shares one, else the literal `"mixed-assets"` (spec §4.1 step 1).
pub fn derive_website_id(sources: &[SourceTuple]) -> String {
    let hosts: HashSet<String> = sources.iter().filter_map(|s| url_host(&s.url_or_path)).collect();
    match hosts.len() {
        1 => hosts.into_iter().next().expect("len checked"),
        _ => "mixed-assets".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_both_source_url_and_source_urls() {
        let input = WorkflowInput {
            job_id: "j1".to_string(),
            knowledge_id: "k1".to_string(),
            source_type: None,
            source_url: Some("https://a.example.com".to_string()),
            source_urls: Some(vec!["https://b.example.com".to_string()]),
            source_name: None,
            source_names: None,
            options: WorkflowOptions::default(),
        };
        assert!(matches!(input.validate(), Err(InputError::AmbiguousOrMissingSource)));
    }

    #[test]
    fn rejects_neither_source_url_nor_source_urls() {
        let input = WorkflowInput {
            job_id: "j1".to_string(),
            knowledge_id: "k1".to_string(),
            source_type: None,
            source_url: None,
            source_urls: None,
            source_name: None,
            source_names: None,
            options: WorkflowOptions::default(),
        };
        assert!(matches!(input.validate(), Err(InputError::AmbiguousOrMissingSource)));
    }

    #[test]
    fn single_source_url_derives_website_id_from_host() {
        let sources = vec![SourceTuple {
            url_or_path: "https://docs.example.com/guide".to_string(),
            name: "guide".to_string(),
            source_type: None,
        }];
        assert_eq!(derive_website_id(&sources), "docs.example.com");
    }

    #[test]
    fn heterogeneous_hosts_fall_back_to_mixed_assets() {
        let sources = vec![
            SourceTuple { url_or_path: "https://a.example.com".to_string(), name: "a".to_string(), source_type: None },
            SourceTuple { url_or_path: "https://b.example.com".to_string(), name: "b".to_string(), source_type: None },
        ];
        assert_eq!(derive_website_id(&sources), "mixed-assets");
    }

    #[test]
    fn mismatched_source_names_length_is_rejected() {
        let input = WorkflowInput {
            job_id: "j1".to_string(),
            knowledge_id: "k1".to_string(),
            source_type: None,
            source_url: None,
            source_urls: Some(vec!["https://a.example.com".to_string(), "https://b.example.com".to_string()]),
            source_name: None,
            source_names: Some(vec!["only-one".to_string()]),
            options: WorkflowOptions::default(),
        };
        assert!(matches!(input.validate(), Err(InputError::SourceNameCountMismatch)));
    }
}
