//! OCR engine implementations
//!
//! This crate ships the REST engine. The declaration tells a document
//! pipeline which MIME types it handles and how strongly it should be
//! preferred over the local engine.

pub mod rest;

use crate::config::OcrBackend;

/// Weight of the REST engine; the local Tesseract engine declares 0
pub const REST_ENGINE_WEIGHT: i32 = 10;

/// MIME types handled by the REST engine and their canonical extensions
pub const SUPPORTED_MIME_TYPES: &[(&str, &str)] = &[
    ("application/pdf", ".pdf"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/tiff", ".tif"),
    ("image/gif", ".gif"),
    ("image/bmp", ".bmp"),
    ("image/webp", ".webp"),
    ("image/heic", ".heic"),
];

/// What an engine offers to the document pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserDeclaration {
    pub name: &'static str,
    pub weight: i32,
    pub mime_types: &'static [(&'static str, &'static str)],
}

impl ParserDeclaration {
    pub fn supports(&self, mime_type: &str) -> bool {
        self.extension_for(mime_type).is_some()
    }

    pub fn extension_for(&self, mime_type: &str) -> Option<&'static str> {
        let mime_type = mime_type.trim().to_lowercase();
        self.mime_types
            .iter()
            .find(|(mime, _)| *mime == mime_type)
            .map(|(_, ext)| *ext)
    }

    /// Reverse lookup by file extension, with or without the leading dot
    pub fn mime_type_for_extension(&self, extension: &str) -> Option<&'static str> {
        let extension = extension.trim_start_matches('.').to_lowercase();
        let extension = match extension.as_str() {
            "jpeg" => "jpg",
            "tiff" => "tif",
            other => other,
        };
        self.mime_types
            .iter()
            .find(|(_, ext)| ext.trim_start_matches('.') == extension)
            .map(|(mime, _)| *mime)
    }
}

/// Declaration for the REST engine, only when it is the selected backend
pub fn declaration(backend: OcrBackend) -> Option<ParserDeclaration> {
    if backend != OcrBackend::RestApi {
        return None;
    }

    Some(ParserDeclaration {
        name: rest::ENGINE_NAME,
        weight: REST_ENGINE_WEIGHT,
        mime_types: SUPPORTED_MIME_TYPES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_declaration_for_local_backend() {
        assert_eq!(declaration(OcrBackend::Tesseract), None);
    }

    #[test]
    fn test_rest_declaration_outweighs_local_engine() {
        let decl = declaration(OcrBackend::RestApi).unwrap();
        assert_eq!(decl.name, "rest_api");
        assert!(decl.weight > 0);
        assert!(decl.supports("application/pdf"));
        assert!(decl.supports("Image/PNG"));
        assert!(!decl.supports("text/plain"));
    }

    #[test]
    fn test_extension_lookup() {
        let decl = declaration(OcrBackend::RestApi).unwrap();
        assert_eq!(decl.extension_for("image/tiff"), Some(".tif"));
        assert_eq!(decl.mime_type_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(decl.mime_type_for_extension(".JPEG"), Some("image/jpeg"));
        assert_eq!(decl.mime_type_for_extension("tiff"), Some("image/tiff"));
        assert_eq!(decl.mime_type_for_extension("docx"), None);
    }
}
