use serde::Deserialize;

use crate::error::DedupError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DedupConfig {
    pub name: String,
    pub operators: OperatorSource,
    #[serde(default)]
    pub plants: Option<PlantSource>,
    #[serde(default)]
    pub generic: GenericNameConfig,
    #[serde(default)]
    pub tie_break: TieBreak,
}

// ---------------------------------------------------------------------------
// Sources + column mappings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OperatorSource {
    pub file: String,
    #[serde(default)]
    pub columns: OperatorColumns,
}

/// Logical field → extract header. Defaults are the MaStR export headers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OperatorColumns {
    pub raw_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl Default for OperatorColumns {
    fn default() -> Self {
        Self {
            raw_id: "MastrNummer".into(),
            name: "Firmenname".into(),
            email: "Email".into(),
            phone: "Telefon".into(),
            website: "Webseite".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantSource {
    pub file: String,
    #[serde(default)]
    pub columns: PlantColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlantColumns {
    pub plant_id: String,
    pub operator_id: String,
}

impl Default for PlantColumns {
    fn default() -> Self {
        Self {
            plant_id: "EinheitMastrNummer".into(),
            operator_id: "AnlagenbetreiberMastrNummer".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic-name classification
// ---------------------------------------------------------------------------

/// Allow-list configuration for the generic-name classifier.
///
/// Entries are compared against the *normalized* name key, so placeholder
/// titles appear here without trailing periods (`dr`, not `Dr.`). The
/// registry's placeholder vocabulary evolves; a stale list degrades match
/// quality but never fails a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenericNameConfig {
    /// Names that denote a category of registrant, never a company.
    pub exact: Vec<String>,
    /// Bare alphabetic tokens up to this length are placeholders.
    pub max_bare_token_len: usize,
    /// Digits-only names are placeholders.
    pub numeric_only: bool,
    /// Surnames too common to identify an entity on their own.
    pub surnames: Vec<String>,
    /// Legal forms that, combined with a bare common surname, stay generic.
    pub surname_forms: Vec<String>,
}

impl Default for GenericNameConfig {
    fn default() -> Self {
        Self {
            exact: [
                "herr",
                "frau",
                "eheleute",
                "familie",
                "dr",
                "prof",
                "photovoltaikanlage",
                "solaranlage",
                "windkraftanlage",
                "biogasanlage",
                "gbr",
                "kg",
                "gmbh",
                "ag",
                "ev",
                "e.v.",
            ]
            .map(String::from)
            .to_vec(),
            max_bare_token_len: 2,
            numeric_only: true,
            surnames: [
                "müller", "schmidt", "schneider", "fischer", "weber", "meyer", "wagner",
            ]
            .map(String::from)
            .to_vec(),
            surname_forms: ["gbr", "gmbh"].map(String::from).to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tie-break
// ---------------------------------------------------------------------------

/// How the canonical record is chosen within a group.
///
/// `First` (insertion order) is the contract downstream joins rely on.
/// `MostContacts` is an explicit opt-in; its ties fall back to first
/// occurrence, so both rules are stable across runs on identical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    First,
    MostContacts,
}

impl Default for TieBreak {
    fn default() -> Self {
        Self::First
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl DedupConfig {
    pub fn from_toml(input: &str) -> Result<Self, DedupError> {
        let config: DedupConfig =
            toml::from_str(input).map_err(|e| DedupError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if self.operators.file.is_empty() {
            return Err(DedupError::ConfigValidation(
                "operators.file must not be empty".into(),
            ));
        }

        let cols = &self.operators.columns;
        for (field, header) in [
            ("raw_id", &cols.raw_id),
            ("name", &cols.name),
            ("email", &cols.email),
            ("phone", &cols.phone),
            ("website", &cols.website),
        ] {
            if header.is_empty() {
                return Err(DedupError::ConfigValidation(format!(
                    "operators.columns.{field} must not be empty"
                )));
            }
        }
        if cols.raw_id == cols.name {
            return Err(DedupError::ConfigValidation(
                "operators.columns: raw_id and name map to the same header".into(),
            ));
        }

        if let Some(ref plants) = self.plants {
            if plants.file.is_empty() {
                return Err(DedupError::ConfigValidation(
                    "plants.file must not be empty".into(),
                ));
            }
            if plants.columns.plant_id.is_empty() || plants.columns.operator_id.is_empty() {
                return Err(DedupError::ConfigValidation(
                    "plants.columns must map both plant_id and operator_id".into(),
                ));
            }
            if plants.columns.plant_id == plants.columns.operator_id {
                return Err(DedupError::ConfigValidation(
                    "plants.columns: plant_id and operator_id map to the same header".into(),
                ));
            }
        }

        if self.generic.exact.iter().any(|e| e.trim().is_empty()) {
            return Err(DedupError::ConfigValidation(
                "generic.exact must not contain empty entries".into(),
            ));
        }
        if self.generic.surname_forms.iter().any(|e| e.trim().is_empty()) {
            return Err(DedupError::ConfigValidation(
                "generic.surname_forms must not contain empty entries".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
