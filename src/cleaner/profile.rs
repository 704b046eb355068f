//! Configuración del motor: qué partes se exigen y cómo se comprueba la salida.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_IDENTITY, DEFAULT_TITLE};
use super::error::{CleanError, Result};
use super::fields::MetadataFields;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanProfile {
    /// Partes que deben existir en la entrada; por defecto ninguna.
    pub required_parts: Vec<String>,
    /// Reabre el paquete generado y rechaza la salida si conserva metadata.
    pub verify_output: bool,
    /// Autor y empresa usados por la limpieza con tiempos simulados.
    pub identity: String,
    pub title: String,
}

impl Default for CleanProfile {
    fn default() -> Self {
        Self {
            required_parts: Vec::new(),
            verify_output: true,
            identity: DEFAULT_IDENTITY.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl CleanProfile {
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| CleanError::io(path, e))?;
        Self::from_json(&contents)
    }

    /// Campos de la variante sin preguntas: identidad fija y tiempos simulados.
    pub fn simulated_fields(&self, minutes: u64) -> MetadataFields {
        MetadataFields {
            title: self.title.clone(),
            ..MetadataFields::simulated(&self.identity, minutes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let profile = CleanProfile::from_json(r#"{"required_parts": ["docProps/core.xml"]}"#).unwrap();
        assert_eq!(profile.required_parts, vec!["docProps/core.xml".to_string()]);
        assert!(profile.verify_output);
        assert_eq!(profile.identity, "CleanBot");
        assert_eq!(profile.title, DEFAULT_TITLE);
    }

    #[test]
    fn simulated_fields_use_profile_identity() {
        let profile = CleanProfile {
            identity: "Oficina".to_string(),
            ..CleanProfile::default()
        };
        let fields = profile.simulated_fields(15);
        assert_eq!(fields.author, "Oficina");
        assert_eq!(fields.company, "Oficina");
        assert_eq!(fields.edit_duration_minutes, 15);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CleanProfile::load(Path::new("/no/existe/perfil.json")).unwrap_err();
        assert!(matches!(err, CleanError::Io { .. }));
    }
}
