//! Ensamblado del paquete: abrir → filtrar → reescribir → reconstruir.
//!
//! Cada etapa consume la anterior, de modo que una llamada no puede llegar a
//! `build` sin haber terminado todas las reescrituras. Si algo falla, no se
//! devuelve ningún byte.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::archive::{Entry, Package, build};
use super::body::sanitize_document_body;
use super::error::{CleanError, Result};
use super::fields::{MetadataFields, ResolvedFields};
use super::parts::{PartKind, RetainedSet, classify};
use super::profile::CleanProfile;
use super::properties::{rewrite_app_properties, rewrite_core_properties};
use super::verify::verify_clean;

/// Modo de una transformación.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanRequest {
    /// Solo limpieza: descarta las propiedades y sanea el cuerpo.
    StripOnly,
    /// Limpieza más reescritura de `core.xml` y `app.xml`.
    Rewrite(MetadataFields),
}

impl CleanRequest {
    pub fn retained_set(&self) -> RetainedSet {
        match self {
            CleanRequest::StripOnly => RetainedSet::STRIP,
            CleanRequest::Rewrite(_) => RetainedSet::REWRITE,
        }
    }
}

/// Resultado de una transformación completa.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanOutcome {
    pub bytes: Vec<u8>,
    pub kept: Vec<String>,
    pub dropped: Vec<String>,
    pub rewritten: Vec<String>,
    pub removed_elements: usize,
}

struct Opened {
    package: Package,
}

struct Filtered {
    entries: Vec<Entry>,
    dropped: Vec<String>,
    fields: Option<ResolvedFields>,
}

struct Rewritten {
    entries: Vec<Entry>,
    dropped: Vec<String>,
    fields: Option<ResolvedFields>,
    rewritten: Vec<String>,
    removed_elements: usize,
}

impl Opened {
    fn open(input: &[u8]) -> Result<Self> {
        let package = Package::open(input)?;
        debug!(entries = package.len(), "paquete abierto");
        Ok(Self { package })
    }

    fn filter(
        self,
        retained: &RetainedSet,
        profile: &CleanProfile,
        fields: Option<&MetadataFields>,
        now: DateTime<Utc>,
    ) -> Result<Filtered> {
        let mut entries = Vec::new();
        let mut dropped = Vec::new();
        for entry in self.package.into_entries() {
            if retained.contains(&entry.path) {
                entries.push(entry);
            } else {
                debug!(path = %entry.path, "descartando parte fuera de la lista blanca");
                dropped.push(entry.path);
            }
        }

        // Una parte exigida tiene que llegar a la salida, no solo a la entrada.
        for part in &profile.required_parts {
            if !entries.iter().any(|entry| entry.path == *part) {
                return Err(CleanError::MissingRequiredPart { part: part.clone() });
            }
        }

        let fields = fields.map(|fields| fields.resolve(now)).transpose()?;

        Ok(Filtered {
            entries,
            dropped,
            fields,
        })
    }
}

impl Filtered {
    fn rewrite(self) -> Result<Rewritten> {
        let Filtered {
            entries,
            dropped,
            fields,
        } = self;

        let mut rewritten = Vec::new();
        let mut removed_elements = 0;
        let mut output = Vec::with_capacity(entries.len());

        for Entry { path, data } in entries {
            let (data, changed) = match (classify(&path), fields.as_ref()) {
                (PartKind::DocumentBody, _) => {
                    let (data, removed) = sanitize_document_body(data)?;
                    debug!(removed, "marcas de revisión eliminadas del cuerpo");
                    removed_elements += removed;
                    (data, removed > 0)
                }
                (PartKind::CoreProperties, Some(fields)) => rewrite_core_properties(data, fields)?,
                (PartKind::ExtendedProperties, Some(fields)) => rewrite_app_properties(data, fields)?,
                _ => (data, false),
            };

            if changed {
                rewritten.push(path.clone());
            }
            output.push(Entry { path, data });
        }

        Ok(Rewritten {
            entries: output,
            dropped,
            fields,
            rewritten,
            removed_elements,
        })
    }
}

impl Rewritten {
    fn rebuild(self, retained: &RetainedSet, profile: &CleanProfile) -> Result<CleanOutcome> {
        let bytes = build(
            self.entries
                .iter()
                .map(|entry| (entry.path.as_str(), entry.data.as_slice())),
        )?;

        if profile.verify_output {
            let report = verify_clean(&bytes, retained, self.fields.as_ref())?;
            if !report.is_clean() {
                let details = report.summary();
                warn!(%details, "la verificación del paquete saneado falló");
                return Err(CleanError::VerificationFailed { details });
            }
        }

        Ok(CleanOutcome {
            bytes,
            kept: self.entries.into_iter().map(|entry| entry.path).collect(),
            dropped: self.dropped,
            rewritten: self.rewritten,
            removed_elements: self.removed_elements,
        })
    }
}

/// Motor de saneamiento. No guarda estado entre llamadas y puede compartirse
/// entre hilos.
#[derive(Clone, Debug, Default)]
pub struct DocxCleaner {
    profile: CleanProfile,
}

impl DocxCleaner {
    pub fn new(profile: CleanProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &CleanProfile {
        &self.profile
    }

    /// Elimina partes no esenciales y rastros de revisión, sin reescribir propiedades.
    pub fn sanitize(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.run(input, &CleanRequest::StripOnly).map(|outcome| outcome.bytes)
    }

    /// Sanea el paquete y reescribe autor, empresa, fechas y tiempo de edición.
    pub fn sanitize_and_rewrite(&self, input: &[u8], fields: &MetadataFields) -> Result<Vec<u8>> {
        self.sanitize_and_rewrite_at(input, fields, Utc::now())
    }

    /// Igual que [`Self::sanitize_and_rewrite`], con el instante "ahora" explícito.
    pub fn sanitize_and_rewrite_at(
        &self,
        input: &[u8],
        fields: &MetadataFields,
        now: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        self.run_at(input, &CleanRequest::Rewrite(fields.clone()), now)
            .map(|outcome| outcome.bytes)
    }

    pub fn run(&self, input: &[u8], request: &CleanRequest) -> Result<CleanOutcome> {
        self.run_at(input, request, Utc::now())
    }

    pub fn run_at(
        &self,
        input: &[u8],
        request: &CleanRequest,
        now: DateTime<Utc>,
    ) -> Result<CleanOutcome> {
        let retained = request.retained_set();
        let fields = match request {
            CleanRequest::StripOnly => None,
            CleanRequest::Rewrite(fields) => Some(fields),
        };

        let outcome = Opened::open(input)?
            .filter(&retained, &self.profile, fields, now)?
            .rewrite()?
            .rebuild(&retained, &self.profile)?;

        info!(
            kept = outcome.kept.len(),
            dropped = outcome.dropped.len(),
            rewritten = outcome.rewritten.len(),
            removed_elements = outcome.removed_elements,
            "documento saneado"
        );
        Ok(outcome)
    }
}

/// Modo de solo limpieza con el perfil por defecto.
pub fn sanitize(input: &[u8]) -> Result<Vec<u8>> {
    DocxCleaner::default().sanitize(input)
}

/// Limpieza con reescritura de propiedades y el perfil por defecto.
pub fn sanitize_and_rewrite(input: &[u8], fields: &MetadataFields) -> Result<Vec<u8>> {
    DocxCleaner::default().sanitize_and_rewrite(input, fields)
}
