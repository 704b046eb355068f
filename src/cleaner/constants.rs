//! Valores compartidos por el motor de saneamiento de paquetes `.docx`.

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const APP_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const ROOT_RELS_PART: &str = "_rels/.rels";
pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CORE_PART: &str = "docProps/core.xml";
pub const APP_PART: &str = "docProps/app.xml";

pub const STRIP_RETAINED_PARTS: [&str; 5] = [
    CONTENT_TYPES_PART,
    ROOT_RELS_PART,
    DOCUMENT_PART,
    STYLES_PART,
    DOCUMENT_RELS_PART,
];

pub const REWRITE_RETAINED_PARTS: [&str; 7] = [
    CONTENT_TYPES_PART,
    ROOT_RELS_PART,
    DOCUMENT_PART,
    STYLES_PART,
    DOCUMENT_RELS_PART,
    CORE_PART,
    APP_PART,
];

/// Elementos de WordprocessingML que delatan revisiones, autores o comentarios.
pub const TRACKED_BODY_ELEMENTS: [&str; 5] = [
    "author",
    "trackRevisions",
    "commentRangeStart",
    "commentRangeEnd",
    "commentReference",
];

pub const W3CDTF_TYPE: &str = "dcterms:W3CDTF";
pub const W3CDTF_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub const DEFAULT_IDENTITY: &str = "CleanBot";
pub const DEFAULT_TITLE: &str = "Document cleaned by Docx Cleaner";
