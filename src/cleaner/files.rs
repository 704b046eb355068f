//! Operaciones sobre archivos: leer el original, escribir la copia limpia.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use super::error::{CleanError, Result};
use super::pipeline::{CleanOutcome, CleanRequest, DocxCleaner};

/// Resumen de una limpieza escrita en disco.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReport {
    pub output: PathBuf,
    pub kept: usize,
    pub dropped: usize,
    pub rewritten: Vec<String>,
    pub removed_elements: usize,
    pub sha256: String,
}

impl FileReport {
    fn new(output: PathBuf, outcome: &CleanOutcome) -> Self {
        Self {
            output,
            kept: outcome.kept.len(),
            dropped: outcome.dropped.len(),
            rewritten: outcome.rewritten.clone(),
            removed_elements: outcome.removed_elements,
            sha256: format!("{:x}", Sha256::digest(&outcome.bytes)),
        }
    }
}

/// Ruta por defecto de la copia limpia: `<nombre>_limpio.docx` junto al original.
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    parent.join(format!("{}_limpio.docx", stem))
}

/// Limpia `input` y escribe el resultado en `output`.
///
/// La salida se escribe primero en un temporal único del mismo directorio y se
/// mueve a su destino solo cuando está completa; si algo falla el temporal se
/// elimina y `output` no se toca.
pub fn clean_file(
    cleaner: &DocxCleaner,
    input: &Path,
    output: &Path,
    request: &CleanRequest,
) -> Result<FileReport> {
    let bytes = fs::read(input).map_err(|e| CleanError::io(input, e))?;
    let outcome = cleaner.run(&bytes, request)?;

    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(directory).map_err(|e| CleanError::io(directory, e))?;
    debug!(temp = %temp.path().display(), "escribiendo copia temporal");

    temp.write_all(&outcome.bytes)
        .map_err(|e| CleanError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| CleanError::io(temp.path(), e))?;
    temp.persist(output)
        .map_err(|e| CleanError::io(output, e.error))?;

    Ok(FileReport::new(output.to_path_buf(), &outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/tmp/docs/informe.docx")),
            PathBuf::from("/tmp/docs/informe_limpio.docx")
        );
        assert_eq!(
            default_output_path(Path::new("informe.docx")),
            PathBuf::from("informe_limpio.docx")
        );
    }
}
