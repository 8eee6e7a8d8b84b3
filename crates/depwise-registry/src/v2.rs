//! XML feed dialect
//!
//! Versions live under `feed/entry/properties/{Id,Version}`. Namespaces are
//! ignored by matching on local names only.

use crate::error::{Error, Result};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use std::collections::BTreeSet;

const FEED_PATH: [&[u8]; 1] = [b"feed"];
const PROPERTIES_PATH: [&[u8]; 3] = [b"feed", b"entry", b"properties"];

#[derive(Default)]
struct Entry {
    id: Option<String>,
    version: Option<String>,
}

/// Collect the versions of every feed entry whose id matches `name`
///
/// Ids compare case-insensitively. Returns `Ok(None)` as soon as an entry
/// carries an empty id, since the feed can then not be trusted.
pub fn parse_feed(xml: &str, name: &str) -> Result<Option<BTreeSet<String>>> {
    let mut reader = Reader::from_str(xml);

    let wanted = name.to_lowercase();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut entry = Entry::default();
    let mut versions = BTreeSet::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.local_name().as_ref().to_vec();
                if is_at(&path, &PROPERTIES_PATH) {
                    touch_field(&mut entry, &local);
                }
                path.push(local);
            }
            Ok(Event::Empty(e)) => {
                if is_at(&path, &PROPERTIES_PATH) {
                    touch_field(&mut entry, e.local_name().as_ref());
                }
            }
            Ok(Event::Text(t)) => {
                let text = String::from_utf8_lossy(&t);
                append_field(&mut entry, &path, &text);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t);
                append_field(&mut entry, &path, &text);
            }
            Ok(Event::GeneralRef(r)) => {
                let text = resolve_reference(&r).map_err(|e| {
                    Error::Xml(format!("at position {}: {}", reader.buffer_position(), e))
                })?;
                append_field(&mut entry, &path, &text);
            }
            Ok(Event::End(_)) => {
                let closed = path.pop();
                if closed.as_deref() == Some(b"entry".as_slice()) && is_at(&path, &FEED_PATH) {
                    let finished = std::mem::take(&mut entry);
                    match finished.id.as_deref().map(str::trim) {
                        // entries without an Id element are not packages
                        None => {}
                        Some("") => return Ok(None),
                        Some(id) => {
                            if id.to_lowercase() == wanted {
                                let version = finished.version.as_deref().map(str::trim);
                                if let Some(version) = version.filter(|v| !v.is_empty()) {
                                    versions.insert(version.to_string());
                                }
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(Some(versions))
}

/// Character references and the predefined XML entities; anything else is
/// kept verbatim
fn resolve_reference(reference: &BytesRef<'_>) -> std::result::Result<String, quick_xml::Error> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = String::from_utf8_lossy(reference);
    Ok(match resolve_predefined_entity(&name) {
        Some(value) => value.to_string(),
        None => format!("&{};", name),
    })
}

fn is_at(path: &[Vec<u8>], expected: &[&[u8]]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a.as_slice() == *b)
}

fn touch_field(entry: &mut Entry, local: &[u8]) {
    match local {
        b"Id" => {
            entry.id.get_or_insert_with(String::new);
        }
        b"Version" => {
            entry.version.get_or_insert_with(String::new);
        }
        _ => {}
    }
}

fn append_field(entry: &mut Entry, path: &[Vec<u8>], text: &str) {
    let Some((field, parent)) = path.split_last() else {
        return;
    };
    if !is_at(parent, &PROPERTIES_PATH) {
        return;
    }

    match field.as_slice() {
        b"Id" => entry.id.get_or_insert_with(String::new).push_str(text),
        b"Version" => entry.version.get_or_insert_with(String::new).push_str(text),
        _ => {}
    }
}
