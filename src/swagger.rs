//! Read-only view over the bundled OpenAPI document. The document is advisory:
//! it drives `endpoints` and `module-info` but never request building.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HtbError, Result};

pub const DEFAULT_SWAGGER_PATH: &str = "swagger.htb";

const METHODS: [&str; 7] = ["get", "post", "put", "patch", "delete", "head", "options"];

#[derive(Debug, Clone, Deserialize)]
pub struct TagDecl {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "operationId")]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwaggerDoc {
    #[serde(default)]
    pub tags: Vec<TagDecl>,
    #[serde(default)]
    pub paths: BTreeMap<String, BTreeMap<String, serde_yaml::Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagSummary {
    pub name: String,
    pub description: Option<String>,
    pub endpoints: usize,
}

pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SWAGGER_PATH))
}

pub fn load(path: &Path) -> Result<SwaggerDoc> {
    if !path.is_file() {
        return Err(HtbError::SwaggerMissing(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<SwaggerDoc> {
    Ok(serde_yaml::from_str(text)?)
}

impl SwaggerDoc {
    /// Every operation in path order. Non-operation keys such as
    /// `parameters` are skipped.
    fn operations(&self) -> Vec<(String, String, Operation)> {
        let mut ops = Vec::new();
        for (path, item) in &self.paths {
            for (method, value) in item {
                let method = method.to_lowercase();
                if !METHODS.contains(&method.as_str()) {
                    continue;
                }
                match serde_yaml::from_value::<Operation>(value.clone()) {
                    Ok(op) => ops.push((method, path.clone(), op)),
                    Err(e) => log::warn!("skipping {method} {path}: {e}"),
                }
            }
        }
        ops
    }

    /// Declared tags first, then tags only seen on operations.
    pub fn tag_summaries(&self) -> Vec<TagSummary> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for (_, _, op) in self.operations() {
            for tag in op.tags {
                *counts.entry(tag).or_default() += 1;
            }
        }

        let mut summaries: Vec<TagSummary> = self
            .tags
            .iter()
            .map(|decl| TagSummary {
                name: decl.name.clone(),
                description: decl.description.clone(),
                endpoints: counts.remove(&decl.name).unwrap_or(0),
            })
            .collect();
        summaries.extend(counts.into_iter().map(|(name, endpoints)| TagSummary {
            name,
            description: None,
            endpoints,
        }));
        summaries
    }

    pub fn endpoints_for(&self, tag: &str) -> Vec<Endpoint> {
        self.operations()
            .into_iter()
            .filter(|(_, _, op)| op.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .map(|(method, path, op)| Endpoint {
                method: method.to_uppercase(),
                path,
                summary: op.summary.or(op.operation_id),
                description: op.description,
            })
            .collect()
    }
}
