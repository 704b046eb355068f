//! Clasificación de las partes de un paquete `.docx`.

use super::constants::{
    APP_PART, CORE_PART, DOCUMENT_PART, REWRITE_RETAINED_PARTS, STRIP_RETAINED_PARTS,
};

/// Tipo de tratamiento que recibe una parte conservada.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    PlainPart,
    DocumentBody,
    CoreProperties,
    ExtendedProperties,
}

/// Lista blanca de rutas que sobreviven al saneamiento.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetainedSet {
    paths: &'static [&'static str],
}

impl RetainedSet {
    /// Conjunto del modo de solo limpieza: las propiedades se descartan.
    pub const STRIP: RetainedSet = RetainedSet {
        paths: &STRIP_RETAINED_PARTS,
    };

    /// Conjunto del modo de reescritura: conserva `core.xml` y `app.xml`.
    pub const REWRITE: RetainedSet = RetainedSet {
        paths: &REWRITE_RETAINED_PARTS,
    };

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&path)
    }

    pub fn paths(&self) -> &'static [&'static str] {
        self.paths
    }
}

pub fn is_retained(path: &str) -> bool {
    RetainedSet::STRIP.contains(path)
}

pub fn classify(path: &str) -> PartKind {
    match path {
        DOCUMENT_PART => PartKind::DocumentBody,
        CORE_PART => PartKind::CoreProperties,
        APP_PART => PartKind::ExtendedProperties,
        _ => PartKind::PlainPart,
    }
}
