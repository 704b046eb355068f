use super::archive::Package;
use super::body::count_tracked_elements;
use super::constants::{APP_PART, CORE_PART, DOCUMENT_PART};
use super::error::Result;
use super::fields::ResolvedFields;
use super::parts::RetainedSet;
use super::properties::{app_mismatches, core_mismatches};

/// Resultado de revisar un paquete ya saneado.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Entradas que no pertenecen a la lista blanca.
    pub unexpected_entries: Vec<String>,
    /// Elementos de revisión o comentarios que siguen en el cuerpo.
    pub tracked_elements: usize,
    /// Campos de propiedades que no tienen el valor esperado.
    pub stale_fields: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.unexpected_entries.is_empty() && self.tracked_elements == 0 && self.stale_fields.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.unexpected_entries.is_empty() {
            parts.push(format!("partes sobrantes: {}", self.unexpected_entries.join(", ")));
        }
        if self.tracked_elements > 0 {
            parts.push(format!("{} elemento(s) de revisión en el cuerpo", self.tracked_elements));
        }
        if !self.stale_fields.is_empty() {
            parts.push(format!("campos sin reescribir: {}", self.stale_fields.join(", ")));
        }
        parts.join("; ")
    }
}

/// Comprueba que un documento saneado no conserva metadata sensible.
pub fn verify_clean(
    bytes: &[u8],
    retained: &RetainedSet,
    expected: Option<&ResolvedFields>,
) -> Result<VerifyReport> {
    let package = Package::open(bytes)?;
    let mut report = VerifyReport::default();

    for (path, _) in package.entries() {
        if !retained.contains(path) {
            report.unexpected_entries.push(path.to_string());
        }
    }

    if let Ok(body) = package.read(DOCUMENT_PART) {
        report.tracked_elements = count_tracked_elements(body)?;
    }

    if let Some(fields) = expected {
        if let Ok(core) = package.read(CORE_PART) {
            report.stale_fields.extend(core_mismatches(core, fields)?);
        }
        if let Ok(app) = package.read(APP_PART) {
            report.stale_fields.extend(app_mismatches(app, fields)?);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::archive::build;

    #[test]
    fn flags_extra_parts_and_tracked_elements() {
        let document = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:commentRangeStart w:id="1"/></w:body></w:document>"#;
        let bytes = build([
            ("word/document.xml", document.as_slice()),
            ("word/comments.xml", b"<comments/>".as_slice()),
        ])
        .unwrap();

        let report = verify_clean(&bytes, &RetainedSet::STRIP, None).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.unexpected_entries, vec!["word/comments.xml".to_string()]);
        assert_eq!(report.tracked_elements, 1);
        assert!(report.summary().contains("word/comments.xml"));
    }

    #[test]
    fn empty_report_is_clean() {
        let bytes = build([("word/styles.xml", b"<w:styles/>".as_slice())]).unwrap();
        let report = verify_clean(&bytes, &RetainedSet::STRIP, None).unwrap();
        assert!(report.is_clean());
        assert!(report.summary().is_empty());
    }
}
