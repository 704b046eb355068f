use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use zip::result::ZipError;

/// Errores tipados del motor. Ninguno se reintenta: la llamada completa se aborta.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("el archivo no es un contenedor ZIP válido: {0}")]
    NotAZip(#[source] ZipError),

    #[error("el contenedor está dañado en '{entry}': {reason}")]
    Corrupt { entry: String, reason: String },

    #[error("XML mal formado en '{part}': {reason}")]
    MalformedXml { part: String, reason: String },

    #[error("falta la parte obligatoria '{part}'")]
    MissingRequiredPart { part: String },

    #[error("la entrada '{path}' no existe en el paquete")]
    NotFound { path: String },

    #[error("la entrada '{path}' aparece más de una vez")]
    DuplicateEntry { path: String },

    #[error("no se pudo escribir el paquete: {0}")]
    ArchiveWrite(#[source] ZipError),

    #[error("fecha inválida '{value}': se espera AAAA-MM-DDTHH:MM:SSZ")]
    InvalidTimestamp { value: String },

    #[error("la verificación encontró metadata residual: {details}")]
    VerificationFailed { details: String },

    #[error("configuración inválida: {0}")]
    Config(#[from] serde_json::Error),

    #[error("error de E/S en '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Categoría plana de un [`CleanError`], sin detalles internos.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotAZip,
    Corrupt,
    MalformedXml,
    MissingRequiredPart,
    NotFound,
    DuplicateEntry,
    ArchiveWrite,
    InvalidTimestamp,
    VerificationFailed,
    Config,
    Io,
}

impl CleanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CleanError::NotAZip(_) => ErrorKind::NotAZip,
            CleanError::Corrupt { .. } => ErrorKind::Corrupt,
            CleanError::MalformedXml { .. } => ErrorKind::MalformedXml,
            CleanError::MissingRequiredPart { .. } => ErrorKind::MissingRequiredPart,
            CleanError::NotFound { .. } => ErrorKind::NotFound,
            CleanError::DuplicateEntry { .. } => ErrorKind::DuplicateEntry,
            CleanError::ArchiveWrite(_) => ErrorKind::ArchiveWrite,
            CleanError::InvalidTimestamp { .. } => ErrorKind::InvalidTimestamp,
            CleanError::VerificationFailed { .. } => ErrorKind::VerificationFailed,
            CleanError::Config(_) => ErrorKind::Config,
            CleanError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn malformed(part: &str, reason: impl ToString) -> Self {
        CleanError::MalformedXml {
            part: part.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CleanError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanError>;
