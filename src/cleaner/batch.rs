//! Limpieza por lote de todos los `.docx` de un directorio.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use walkdir::WalkDir;

use super::error::{CleanError, ErrorKind, Result};
use super::files::{clean_file, default_output_path};
use super::pipeline::{CleanRequest, DocxCleaner};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CleanupEvent {
    Started { total: usize },
    Processing { index: usize, total: usize, path: PathBuf },
    Success { path: PathBuf, output: PathBuf },
    Failure {
        path: PathBuf,
        kind: ErrorKind,
        error: String,
    },
    Finished { successes: usize, failures: usize },
}

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

fn is_cleaned_copy(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with("_limpio"))
}

/// Reúne los `.docx` del directorio, ordenados, sin incluir copias ya limpias.
pub fn collect_docx_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(CleanError::io(
            root,
            std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "la ruta proporcionada no es un directorio",
            ),
        ));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            CleanError::io(path, e.into())
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && is_docx(path) && !is_cleaned_copy(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Limpia cada archivo en su ruta por defecto e informa el progreso por `sender`.
///
/// Un archivo que falla no detiene el lote.
pub fn run_batch_with_sender(
    cleaner: &DocxCleaner,
    files: Vec<PathBuf>,
    request: &CleanRequest,
    sender: Sender<CleanupEvent>,
) {
    let total = files.len();
    let _ = sender.send(CleanupEvent::Started { total });

    let mut successes = 0_usize;
    let mut failures = 0_usize;

    for (index, path) in files.into_iter().enumerate() {
        let _ = sender.send(CleanupEvent::Processing {
            index: index + 1,
            total,
            path: path.clone(),
        });

        let output = default_output_path(&path);
        match clean_file(cleaner, &path, &output, request) {
            Ok(report) => {
                successes += 1;
                let _ = sender.send(CleanupEvent::Success {
                    path,
                    output: report.output,
                });
            }
            Err(error) => {
                failures += 1;
                let _ = sender.send(CleanupEvent::Failure {
                    path,
                    kind: error.kind(),
                    error: error.to_string(),
                });
            }
        }
    }

    let _ = sender.send(CleanupEvent::Finished { successes, failures });
}
