//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test scenarios.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::api::types::string_or_number;
use crate::api::PetFilter;
use crate::common::{Error, Result};

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct TestScenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// Service defect this scenario pins down, if it asserts buggy behavior
    pub known_defect: Option<String>,
    /// The sequence of test steps to execute
    pub steps: Vec<TestStep>,
}

impl TestScenario {
    /// Parse a scenario from YAML text; `origin` names it in errors
    pub fn parse(origin: &str, content: &str) -> Result<Self> {
        let scenario: TestScenario =
            serde_yaml::from_str(content).map_err(|e| Error::scenario_parse(origin, e))?;

        if scenario.name.trim().is_empty() {
            return Err(Error::scenario_parse(origin, "scenario name is empty"));
        }
        if scenario.steps.is_empty() {
            return Err(Error::scenario_parse(origin, "scenario has no steps"));
        }
        Ok(scenario)
    }

    /// Load a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&path.display().to_string(), &content)
    }
}

/// Which configured credential pair to authenticate with
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSet {
    /// The registered email with its password
    Valid,
    /// An unregistered email with the valid password
    InvalidEmail,
    /// The registered email with a wrong password
    InvalidPassword,
}

/// Credentials for an authenticate step
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CredentialsRef {
    Named(CredentialSet),
    Explicit { email: String, password: String },
}

/// A single test step in the execution flow
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Request a session key; a returned key is kept for later steps
    Authenticate {
        credentials: CredentialsRef,
        expect: Option<ResponseExpectation>,
    },
    /// List pets
    ListPets {
        #[serde(default)]
        filter: PetFilter,
        expect: Option<ResponseExpectation>,
    },
    /// Create a pet, with a photo when one is given
    AddPet {
        name: String,
        animal_type: String,
        #[serde(deserialize_with = "string_or_number")]
        age: String,
        photo: Option<PathBuf>,
        expect: Option<ResponseExpectation>,
    },
    /// Select the first own pet, creating one first if the user has none
    EnsureMyPet {
        name: String,
        animal_type: String,
        #[serde(deserialize_with = "string_or_number")]
        age: String,
        photo: Option<PathBuf>,
    },
    /// Select the pet at `index` of a listing
    SelectPet {
        #[serde(default)]
        filter: PetFilter,
        #[serde(default)]
        index: usize,
    },
    /// Update name, type and age of the selected pet
    UpdatePet {
        name: String,
        animal_type: String,
        #[serde(deserialize_with = "string_or_number")]
        age: String,
        expect: Option<ResponseExpectation>,
    },
    /// Replace the photo of the selected pet
    SetPhoto {
        photo: PathBuf,
        expect: Option<ResponseExpectation>,
    },
    /// Delete the selected pet
    DeletePet { expect: Option<ResponseExpectation> },
}

impl TestStep {
    /// Short action name used in progress output
    pub fn action(&self) -> &'static str {
        match self {
            TestStep::Authenticate { .. } => "authenticate",
            TestStep::ListPets { .. } => "list_pets",
            TestStep::AddPet { .. } => "add_pet",
            TestStep::EnsureMyPet { .. } => "ensure_my_pet",
            TestStep::SelectPet { .. } => "select_pet",
            TestStep::UpdatePet { .. } => "update_pet",
            TestStep::SetPhoto { .. } => "set_photo",
            TestStep::DeletePet { .. } => "delete_pet",
        }
    }
}

/// A field value compared as a string; YAML numbers are accepted
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldValue(#[serde(deserialize_with = "string_or_number")] pub String);

/// Expectations for a response; every present check must hold
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ResponseExpectation {
    /// Exact status code
    pub status: Option<u16>,
    /// Any status code except this one
    pub status_not: Option<u16>,
    /// Top-level JSON field that must be present
    pub has_field: Option<String>,
    /// Top-level JSON field that must be absent
    pub lacks_field: Option<String>,
    /// Top-level fields and their exact expected values
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Fields whose value must differ from the selected pet's
    #[serde(default)]
    pub changed_from_selected: Vec<String>,
    /// Minimum number of pets in a listing
    pub min_pets: Option<usize>,
    /// The listing must not contain the selected pet's id
    #[serde(default)]
    pub excludes_selected: bool,
    /// Checks on the pet found at a given listing position
    pub pet_at: Option<PetAtExpectation>,
}

/// Expectations on one position of a listing
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct PetAtExpectation {
    /// Zero-based index into `pets`
    pub index: usize,
    /// Fields that must differ from the selected pet's
    #[serde(default)]
    pub differs_from_selected: Vec<String>,
}
