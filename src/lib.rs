//! Docx Cleaner: elimina metadata, historial de revisiones y partes no
//! esenciales de documentos `.docx`, y opcionalmente reescribe sus propiedades.
//!
//! ```no_run
//! let original = std::fs::read("informe.docx").unwrap();
//! let limpio = docx_cleaner::sanitize(&original).unwrap();
//! std::fs::write("informe_limpio.docx", limpio).unwrap();
//! ```

pub mod cleaner;

pub use cleaner::{
    CleanError, CleanProfile, CleanRequest, DocxCleaner, MetadataFields, sanitize,
    sanitize_and_rewrite,
};
