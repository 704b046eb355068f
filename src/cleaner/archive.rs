use std::collections::HashSet;
use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use super::error::{CleanError, Result};

/// Tope de la reserva inicial por entrada; el tamaño declarado en la cabecera
/// viene de la entrada y no es de fiar.
const MAX_PREALLOCATION: usize = 8 * 1024 * 1024;

fn preallocation_hint(declared_size: u64) -> usize {
    usize::try_from(declared_size)
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOCATION)
}

/// Una parte del paquete: ruta relativa estilo POSIX y su contenido.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub data: Vec<u8>,
}

/// Contenedor ZIP de un `.docx` extraído completamente en memoria.
#[derive(Clone, Debug, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Abre un flujo de bytes como ZIP y extrae todas sus entradas en orden.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(CleanError::NotAZip)?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| CleanError::Corrupt {
                entry: format!("#{}", i),
                reason: e.to_string(),
            })?;

            if file.is_dir() {
                continue;
            }

            let path = file.name().to_string();
            let mut data = Vec::with_capacity(preallocation_hint(file.size()));
            file.read_to_end(&mut data)
                .map_err(|e| CleanError::Corrupt {
                    entry: path.clone(),
                    reason: e.to_string(),
                })?;

            if !seen.insert(path.clone()) {
                return Err(CleanError::Corrupt {
                    entry: path,
                    reason: "ruta duplicada en el directorio central".to_string(),
                });
            }

            entries.push(Entry { path, data });
        }

        Ok(Self { entries })
    }

    /// Lista las entradas como pares `(ruta, tamaño)`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.path.as_str(), entry.data.len() as u64))
    }

    pub fn read(&self, path: &str) -> Result<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.data.as_slice())
            .ok_or_else(|| CleanError::NotFound {
                path: path.to_string(),
            })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

/// Escribe un ZIP nuevo con las entradas en el orden recibido.
///
/// Todas las entradas llevan la misma fecha fija para que la salida sea
/// reproducible y no arrastre las fechas internas del archivo original.
pub fn build<'a, I>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<'_, ()>::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut seen = HashSet::new();
    for (path, data) in entries {
        if !seen.insert(path) {
            return Err(CleanError::DuplicateEntry {
                path: path.to_string(),
            });
        }

        writer
            .start_file(path, options)
            .map_err(CleanError::ArchiveWrite)?;
        writer
            .write_all(data)
            .map_err(|e| CleanError::ArchiveWrite(e.into()))?;
    }

    let cursor = writer.finish().map_err(CleanError::ArchiveWrite)?;
    Ok(cursor.into_inner())
}
