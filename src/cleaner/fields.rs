//! Valores de metadata que recibe una reescritura y su resolución temporal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_IDENTITY, DEFAULT_TITLE, W3CDTF_FORMAT};
use super::error::{CleanError, Result};

/// Marca de tiempo en el perfil `AAAA-MM-DDTHH:MM:SSZ` (UTC, sin fracciones).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct W3cdtf(String);

impl W3cdtf {
    pub fn from_datetime(value: DateTime<Utc>) -> Result<Self> {
        if !(0..=9999).contains(&value.year()) {
            return Err(CleanError::InvalidTimestamp {
                value: value.to_rfc3339(),
            });
        }
        Ok(Self(value.format(W3CDTF_FORMAT).to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for W3cdtf {
    type Err = CleanError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || CleanError::InvalidTimestamp {
            value: value.to_string(),
        };

        // chrono acepta años con menos dígitos; el perfil exige exactamente 20 caracteres.
        if value.len() != 20 || !value.is_ascii() {
            return Err(invalid());
        }
        NaiveDateTime::parse_from_str(value, W3CDTF_FORMAT).map_err(|_| invalid())?;
        Ok(Self(value.to_string()))
    }
}

impl TryFrom<String> for W3cdtf {
    type Error = CleanError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<W3cdtf> for String {
    fn from(value: W3cdtf) -> Self {
        value.0
    }
}

impl fmt::Display for W3cdtf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Origen de una fecha de la metadata.
///
/// En JSON se escribe como una marca de tiempo, `"now"` o `"edit-start"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSpec {
    At(W3cdtf),
    /// Momento en que se ejecuta la transformación.
    Now,
    /// Momento actual menos la duración de edición simulada.
    EditStart,
}

impl TimeSpec {
    fn resolve(&self, now: DateTime<Utc>, edit_duration_minutes: u64) -> Result<W3cdtf> {
        match self {
            TimeSpec::At(value) => Ok(value.clone()),
            TimeSpec::Now => W3cdtf::from_datetime(now),
            TimeSpec::EditStart => {
                let out_of_range = || CleanError::InvalidTimestamp {
                    value: format!("{} - {} min", now.format(W3CDTF_FORMAT), edit_duration_minutes),
                };
                let minutes = i64::try_from(edit_duration_minutes).map_err(|_| out_of_range())?;
                let offset = TimeDelta::try_minutes(minutes).ok_or_else(out_of_range)?;
                let start = now.checked_sub_signed(offset).ok_or_else(out_of_range)?;
                W3cdtf::from_datetime(start)
            }
        }
    }
}

impl FromStr for TimeSpec {
    type Err = CleanError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "now" | "ahora" => Ok(TimeSpec::Now),
            "edit-start" | "inicio-edicion" => Ok(TimeSpec::EditStart),
            other => other.parse().map(TimeSpec::At),
        }
    }
}

impl TryFrom<String> for TimeSpec {
    type Error = CleanError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeSpec> for String {
    fn from(value: TimeSpec) -> Self {
        match value {
            TimeSpec::At(timestamp) => timestamp.into(),
            TimeSpec::Now => "now".to_string(),
            TimeSpec::EditStart => "edit-start".to_string(),
        }
    }
}

/// Campos que la reescritura aplica sobre `core.xml` y `app.xml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFields {
    pub author: String,
    pub company: String,
    #[serde(default = "default_title")]
    pub title: String,
    pub created: TimeSpec,
    pub modified: TimeSpec,
    pub last_printed: TimeSpec,
    #[serde(default)]
    pub edit_duration_minutes: u64,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl MetadataFields {
    /// Identidad fija con tiempos simulados: creado hace `minutes` minutos,
    /// modificado e impreso en el momento de la limpieza.
    pub fn simulated(identity: &str, minutes: u64) -> Self {
        Self {
            author: identity.to_string(),
            company: identity.to_string(),
            title: default_title(),
            created: TimeSpec::EditStart,
            modified: TimeSpec::Now,
            last_printed: TimeSpec::Now,
            edit_duration_minutes: minutes,
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Fija todas las fechas a partir de una única lectura del reloj.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<ResolvedFields> {
        let minutes = self.edit_duration_minutes;
        Ok(ResolvedFields {
            author: self.author.clone(),
            company: self.company.clone(),
            title: self.title.clone(),
            created: self.created.resolve(now, minutes)?,
            modified: self.modified.resolve(now, minutes)?,
            last_printed: self.last_printed.resolve(now, minutes)?,
            edit_duration_minutes: minutes,
        })
    }
}

impl Default for MetadataFields {
    fn default() -> Self {
        Self::simulated(DEFAULT_IDENTITY, 0)
    }
}

/// Campos con todas las fechas ya resueltas a marcas W3CDTF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFields {
    pub author: String,
    pub company: String,
    pub title: String,
    pub created: W3cdtf,
    pub modified: W3cdtf,
    pub last_printed: W3cdtf,
    pub edit_duration_minutes: u64,
}

impl ResolvedFields {
    /// Valor decimal de `TotalTime`.
    pub fn total_time(&self) -> String {
        self.edit_duration_minutes.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(value: &str) -> TimeSpec {
        TimeSpec::At(value.parse().unwrap())
    }

    #[test]
    fn timestamp_profile_is_strict() {
        assert!("2024-01-01T00:00:00Z".parse::<W3cdtf>().is_ok());
        for bad in [
            "2024-01-01",
            "2024-01-01T00:00:00",
            "2024-01-01T00:00:00.5Z",
            "2024-01-01T00:00:00+00:00",
            "2024-13-01T00:00:00Z",
            "2024-02-30T00:00:00Z",
            "24-01-01T00:00:00Z",
            " 2024-01-01T00:00:00Z",
        ] {
            assert!(bad.parse::<W3cdtf>().is_err(), "{} debería rechazarse", bad);
        }
    }

    #[test]
    fn edit_start_subtracts_duration() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let fields = MetadataFields::simulated("CleanBot", 90);

        let resolved = fields.resolve(now).unwrap();
        assert_eq!(resolved.created.as_str(), "2024-06-01T10:30:00Z");
        assert_eq!(resolved.modified.as_str(), "2024-06-01T12:00:00Z");
        assert_eq!(resolved.last_printed.as_str(), "2024-06-01T12:00:00Z");
        assert_eq!(resolved.total_time(), "90");
    }

    #[test]
    fn huge_duration_is_rejected_not_wrapped() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let fields = MetadataFields::simulated("CleanBot", u64::MAX);
        let err = fields.resolve(now).unwrap_err();
        assert!(matches!(err, CleanError::InvalidTimestamp { .. }));
    }

    #[test]
    fn fields_deserialize_from_json() {
        let fields = MetadataFields::from_json(
            r#"{
                "author": "A. Name",
                "company": "Acme",
                "created": "2024-01-01T00:00:00Z",
                "modified": "now",
                "last_printed": "edit-start",
                "edit_duration_minutes": 42
            }"#,
        )
        .unwrap();

        assert_eq!(fields.created, at("2024-01-01T00:00:00Z"));
        assert_eq!(fields.modified, TimeSpec::Now);
        assert_eq!(fields.last_printed, TimeSpec::EditStart);
        assert_eq!(fields.title, DEFAULT_TITLE);
        assert_eq!(fields.edit_duration_minutes, 42);
    }

    #[test]
    fn invalid_json_timestamp_is_a_config_error() {
        let err = MetadataFields::from_json(
            r#"{"author":"a","company":"b","created":"ayer","modified":"now","last_printed":"now"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));
    }
}
