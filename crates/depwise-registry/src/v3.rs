//! JSON dialect: registration index, search and flat versions list

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Registration index: a list of pages, inlined or by reference
#[derive(Debug, Deserialize)]
pub struct RegistrationIndex {
    pub items: Vec<RegistrationPage>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationPage {
    /// Page URL, fetched when the leaves are not inlined
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<RegistrationLeaf>>,
}

/// A separately fetched registration page
#[derive(Debug, Deserialize)]
pub struct RegistrationPageBody {
    pub items: Vec<RegistrationLeaf>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationLeaf {
    #[serde(rename = "catalogEntry")]
    pub catalog_entry: CatalogEntry,
}

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub version: String,
    #[serde(default)]
    pub listed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub versions: Vec<SearchVersion>,
}

#[derive(Debug, Deserialize)]
pub struct SearchVersion {
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct VersionsResponse {
    pub versions: Vec<String>,
}

/// Versions from leaves inlined in the index
///
/// An inlined entry without a `listed` flag counts as listed.
pub fn inlined_versions(leaves: &[RegistrationLeaf]) -> impl Iterator<Item = String> + '_ {
    leaves
        .iter()
        .filter(|leaf| leaf.catalog_entry.listed.unwrap_or(true))
        .map(|leaf| leaf.catalog_entry.version.clone())
}

/// Versions from a separately fetched page
///
/// Paged entries count only when explicitly listed.
pub fn paged_versions(leaves: &[RegistrationLeaf]) -> impl Iterator<Item = String> + '_ {
    leaves
        .iter()
        .filter(|leaf| leaf.catalog_entry.listed == Some(true))
        .map(|leaf| leaf.catalog_entry.version.clone())
}

/// Versions of the first search hit whose id matches `name` case-insensitively
pub fn search_versions(response: &SearchResponse, name: &str) -> Option<BTreeSet<String>> {
    let wanted = name.to_lowercase();
    response
        .data
        .iter()
        .find(|hit| hit.id.to_lowercase() == wanted)
        .map(|hit| hit.versions.iter().map(|v| v.version.clone()).collect())
}

/// Parse a JSON body after stripping wrapping zero-width characters
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(strip_zero_width(body))?)
}

/// Remove zero-width spaces, joiners and byte-order marks around `body`
pub fn strip_zero_width(body: &str) -> &str {
    body.trim_matches(|c| matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
}
