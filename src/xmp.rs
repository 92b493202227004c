//! XMP packet reader
//!
//! Flattens the properties of each `rdf:Description` in an XMP packet into
//! [`MetadataEntry`] values keyed by namespace URI and local name. Array
//! values (`rdf:Bag`, `rdf:Seq`, `rdf:Alt`) are joined with spaces.

use crate::engine::MetadataEntry;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Read the XMP packet attached to the PDF catalog at `path`
pub fn read_pdf(path: &Path) -> Vec<MetadataEntry> {
    let document = match lopdf::Document::load(path) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Error while reading metadata from {:?}: {}", path, e);
            return Vec::new();
        }
    };

    let stream = document
        .catalog()
        .and_then(|catalog| catalog.get(b"Metadata"))
        .and_then(|object| object.as_reference())
        .and_then(|id| document.get_object(id))
        .and_then(|object| object.as_stream());
    let stream = match stream {
        Ok(stream) => stream,
        Err(_) => {
            tracing::debug!("No XMP metadata in {:?}", path);
            return Vec::new();
        }
    };

    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    match String::from_utf8(bytes) {
        Ok(xml) => parse(&xml),
        Err(_) => {
            tracing::debug!("Skipping XMP metadata in {:?}: not valid UTF-8", path);
            Vec::new()
        }
    }
}

/// Parse an XMP packet into flat entries
pub fn parse(xml: &str) -> Vec<MetadataEntry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scopes = Scopes::default();
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut description_depth: Option<usize> = None;
    let mut property: Option<Property> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                scopes.push(&e);
                let (prefix, local) = split_name(e.name().as_ref());
                if description_depth.is_none() && scopes.is_rdf(&prefix, &local, "Description") {
                    description_depth = Some(depth);
                    attribute_entries(&e, &scopes, &mut entries);
                } else if description_depth.map(|d| d + 1) == Some(depth) {
                    property = Property::open(prefix, local, &scopes);
                }
            }
            Ok(Event::Empty(e)) => {
                scopes.push(&e);
                let (prefix, local) = split_name(e.name().as_ref());
                if description_depth.is_none() && scopes.is_rdf(&prefix, &local, "Description") {
                    attribute_entries(&e, &scopes, &mut entries);
                } else if description_depth == Some(depth) {
                    if let Some(empty) = Property::open(prefix, local, &scopes) {
                        entries.push(empty.finish());
                    }
                }
                scopes.pop();
            }
            Ok(Event::Text(e)) => {
                if let Some(open) = property.as_mut() {
                    if let Ok(text) = std::str::from_utf8(e.as_ref()) {
                        open.values.push(unescape_xml(text));
                    }
                }
            }
            Ok(Event::End(_)) => {
                if description_depth.map(|d| d + 1) == Some(depth) {
                    if let Some(done) = property.take() {
                        entries.push(done.finish());
                    }
                } else if description_depth == Some(depth) {
                    description_depth = None;
                }
                scopes.pop();
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!("Malformed XMP packet: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    entries
}

/// Namespace declarations in scope, innermost last
#[derive(Default)]
struct Scopes {
    frames: Vec<Vec<(String, String)>>,
}

impl Scopes {
    fn push(&mut self, element: &BytesStart) {
        let mut declared = Vec::new();
        for attr in element.attributes().flatten() {
            let key = attr.key.as_ref();
            let prefix = match key.strip_prefix(b"xmlns:") {
                Some(prefix) => prefix,
                None if key == b"xmlns" => b"".as_slice(),
                None => continue,
            };
            if let (Ok(prefix), Ok(uri)) =
                (std::str::from_utf8(prefix), std::str::from_utf8(&attr.value))
            {
                declared.push((prefix.to_string(), unescape_xml(uri)));
            }
        }
        self.frames.push(declared);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .flatten()
            .find(|(declared, _)| declared == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn is_rdf(&self, prefix: &str, local: &str, name: &str) -> bool {
        local == name && self.resolve(prefix) == Some(RDF_NS)
    }
}

/// A property element being read
struct Property {
    namespace: String,
    prefix: String,
    key: String,
    values: Vec<String>,
}

impl Property {
    fn open(prefix: String, key: String, scopes: &Scopes) -> Option<Self> {
        let Some(namespace) = scopes.resolve(&prefix).filter(|ns| !ns.is_empty()) else {
            tracing::debug!("Skipping XMP property '{}' without a namespace", key);
            return None;
        };
        Some(Self {
            namespace: namespace.to_string(),
            prefix,
            key,
            values: Vec::new(),
        })
    }

    fn finish(self) -> MetadataEntry {
        MetadataEntry {
            namespace: self.namespace,
            prefix: self.prefix,
            key: self.key,
            value: self.values.join(" "),
        }
    }
}

/// Simple properties written as attributes of `rdf:Description`
fn attribute_entries(element: &BytesStart, scopes: &Scopes, entries: &mut Vec<MetadataEntry>) {
    for attr in element.attributes().flatten() {
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (prefix, local) = split_name(key);
        if scopes.resolve(&prefix) == Some(RDF_NS) {
            continue;
        }
        let Ok(value) = std::str::from_utf8(&attr.value) else {
            tracing::debug!("Skipping XMP attribute '{}': not valid UTF-8", local);
            continue;
        };
        if let Some(mut property) = Property::open(prefix, local, scopes) {
            property.values.push(unescape_xml(value));
            entries.push(property.finish());
        }
    }
}

fn split_name(raw: &[u8]) -> (String, String) {
    let name = String::from_utf8_lossy(raw);
    match name.split_once(':') {
        Some((prefix, local)) => (prefix.to_string(), local.to_string()),
        None => (String::new(), name.into_owned()),
    }
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
