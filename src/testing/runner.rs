//! Test runner implementation
//!
//! Executes scenarios sequentially against a live (or mocked) PetFriends
//! service. Each scenario starts from a blank state, authenticates itself
//! and fetches whatever pets it needs.

use std::fmt;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::api::{ApiResponse, Pet, PetFields, PetFilter, PetFriendsClient, SessionKey};
use crate::common::config::Credentials;
use crate::common::paths::resolve_fixture;
use crate::common::{Error, Result};

use super::config::{
    CredentialSet, CredentialsRef, ResponseExpectation, TestScenario, TestStep,
};

/// How a scenario ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// An expectation on a response did not hold
    Failed(String),
    /// The scenario could not reach the state it needed
    PreconditionFailed(String),
    /// Transport or local IO failure
    Errored(String),
}

impl Outcome {
    fn from_error(error: Error) -> Self {
        match error {
            Error::TestAssertion(msg) => Outcome::Failed(msg),
            Error::Precondition(msg) => Outcome::PreconditionFailed(msg),
            other => Outcome::Errored(other.to_string()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => f.write_str("passed"),
            Outcome::Failed(msg) => write!(f, "failed: {}", msg),
            Outcome::PreconditionFailed(msg) => write!(f, "precondition not met: {}", msg),
            Outcome::Errored(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Result of a scenario run
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub known_defect: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub outcome: Outcome,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Results of a whole run, in execution order
#[derive(Debug, Clone, Default)]
pub struct SuiteSummary {
    pub results: Vec<ScenarioResult>,
}

impl SuiteSummary {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// State one scenario accumulates between steps
#[derive(Default)]
struct ScenarioState {
    key: Option<SessionKey>,
    selected: Option<Pet>,
}

impl ScenarioState {
    fn key(&self) -> Result<&SessionKey> {
        self.key.as_ref().ok_or_else(|| {
            Error::Precondition("no session key; authenticate with valid credentials first".into())
        })
    }

    fn selected(&self) -> Result<&Pet> {
        self.selected.as_ref().ok_or_else(|| {
            Error::Precondition("no pet selected; use select_pet or ensure_my_pet first".into())
        })
    }
}

/// Runs scenarios against one service with one set of credentials
pub struct Runner {
    client: PetFriendsClient,
    credentials: Credentials,
    fixtures_dir: PathBuf,
    verbose: bool,
}

impl Runner {
    pub fn new(client: PetFriendsClient, credentials: Credentials, fixtures_dir: PathBuf) -> Self {
        Self {
            client,
            credentials,
            fixtures_dir,
            verbose: false,
        }
    }

    /// Print response bodies after every step
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run every scenario in order; a failing scenario never stops the run
    pub async fn run_all(&self, scenarios: &[TestScenario]) -> SuiteSummary {
        let mut summary = SuiteSummary::default();
        for scenario in scenarios {
            summary.results.push(self.run_scenario(scenario).await);
        }
        print_summary(&summary);
        summary
    }

    /// Run a single scenario
    pub async fn run_scenario(&self, scenario: &TestScenario) -> ScenarioResult {
        let steps_total = scenario.steps.len();

        println!(
            "\n{} {}",
            "Running Test:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
        if let Some(defect) = &scenario.known_defect {
            println!("  {} {}", "Known defect:".yellow(), defect.dimmed());
        }

        tracing::debug!(scenario = %scenario.name, steps = steps_total, "starting scenario");

        let mut state = ScenarioState::default();

        for (i, step) in scenario.steps.iter().enumerate() {
            let step_num = i + 1;
            tracing::debug!(
                scenario = %scenario.name,
                step = step_num,
                action = step.action(),
                "executing step"
            );

            match self.execute_step(&mut state, step).await {
                Ok(label) => {
                    println!("  {} Step {}: {}", "✓".green(), step_num, label.dimmed());
                }
                Err(e) => {
                    println!("  {} Step {} ({}): {}", "✗".red(), step_num, step.action(), e);
                    tracing::info!(
                        scenario = %scenario.name,
                        step = step_num,
                        action = step.action(),
                        error = %e,
                        "scenario failed"
                    );

                    return ScenarioResult {
                        name: scenario.name.clone(),
                        known_defect: scenario.known_defect.is_some(),
                        steps_run: step_num,
                        steps_total,
                        outcome: Outcome::from_error(e),
                    };
                }
            }
        }

        println!("{} {}", "✓".green().bold(), "Test Passed".green().bold());

        ScenarioResult {
            name: scenario.name.clone(),
            known_defect: scenario.known_defect.is_some(),
            steps_run: steps_total,
            steps_total,
            outcome: Outcome::Passed,
        }
    }

    /// Execute a single step, returning the progress label on success
    async fn execute_step(&self, state: &mut ScenarioState, step: &TestStep) -> Result<String> {
        match step {
            TestStep::Authenticate {
                credentials,
                expect,
            } => {
                let (email, password) = self.resolve_credentials(credentials);
                let response = self.client.get_api_key(email, password).await?;
                if let Some(key) = response.session_key() {
                    state.key = Some(key);
                }
                self.check(&response, expect.as_ref(), state)?;
                Ok(format!(
                    "authenticate ({}) -> {}",
                    describe_credentials(credentials),
                    response.status
                ))
            }

            TestStep::ListPets { filter, expect } => {
                let response = self.client.get_list_of_pets(state.key()?, *filter).await?;
                self.check(&response, expect.as_ref(), state)?;
                let count = response.pets().map(|p| p.len()).unwrap_or(0);
                Ok(format!(
                    "list_pets ({}) -> {}, {} pets",
                    filter, response.status, count
                ))
            }

            TestStep::AddPet {
                name,
                animal_type,
                age,
                photo,
                expect,
            } => {
                let fields = PetFields::new(name, animal_type, age);
                let response = self.add_pet(state.key()?, &fields, photo.as_deref()).await?;
                self.check(&response, expect.as_ref(), state)?;
                Ok(format!(
                    "add_pet '{}' ({}) -> {}",
                    shorten(name, 40),
                    photo_label(photo.as_deref()),
                    response.status
                ))
            }

            TestStep::EnsureMyPet {
                name,
                animal_type,
                age,
                photo,
            } => {
                let key = state.key()?.clone();
                let mut pets = self.list_for_selection(&key, PetFilter::MyPets).await?;
                let mut created = false;

                if pets.is_empty() {
                    let fields = PetFields::new(name, animal_type, age);
                    let response = self.add_pet(&key, &fields, photo.as_deref()).await?;
                    if !response.is_success() {
                        return Err(Error::Precondition(format!(
                            "user has no pets and creating one returned {}",
                            response.status
                        )));
                    }
                    created = true;
                    pets = self.list_for_selection(&key, PetFilter::MyPets).await?;
                }

                let pet = pets.into_iter().next().ok_or_else(|| {
                    Error::Precondition("there are no own pets to work with".into())
                })?;
                let label = format!(
                    "ensure_my_pet -> {} '{}'{}",
                    pet.id,
                    shorten(&pet.name, 40),
                    if created { " (created)" } else { "" }
                );
                state.selected = Some(pet);
                Ok(label)
            }

            TestStep::SelectPet { filter, index } => {
                let pets = self.list_for_selection(state.key()?, *filter).await?;
                let total = pets.len();
                let pet = pets.into_iter().nth(*index).ok_or_else(|| {
                    Error::Precondition(format!(
                        "no pet at index {} of the {} listing ({} pets)",
                        index, filter, total
                    ))
                })?;
                let label = format!(
                    "select_pet {}[{}] -> {} '{}'",
                    filter,
                    index,
                    pet.id,
                    shorten(&pet.name, 40)
                );
                state.selected = Some(pet);
                Ok(label)
            }

            TestStep::UpdatePet {
                name,
                animal_type,
                age,
                expect,
            } => {
                let pet_id = state.selected()?.id.clone();
                let fields = PetFields::new(name, animal_type, age);
                let response = self
                    .client
                    .update_pet_info(state.key()?, &pet_id, &fields)
                    .await?;
                self.check(&response, expect.as_ref(), state)?;
                Ok(format!("update_pet {} -> {}", pet_id, response.status))
            }

            TestStep::SetPhoto { photo, expect } => {
                let pet_id = state.selected()?.id.clone();
                let path = self.fixture(photo);
                let response = self
                    .client
                    .update_pet_photo(state.key()?, &pet_id, &path)
                    .await?;
                self.check(&response, expect.as_ref(), state)?;
                Ok(format!(
                    "set_photo {} ({}) -> {}",
                    pet_id,
                    photo.display(),
                    response.status
                ))
            }

            TestStep::DeletePet { expect } => {
                let pet_id = state.selected()?.id.clone();
                let response = self.client.delete_pet(state.key()?, &pet_id).await?;
                self.check(&response, expect.as_ref(), state)?;
                Ok(format!("delete_pet {} -> {}", pet_id, response.status))
            }
        }
    }

    fn resolve_credentials<'a>(&'a self, credentials: &'a CredentialsRef) -> (&'a str, &'a str) {
        let creds = &self.credentials;
        match credentials {
            CredentialsRef::Named(CredentialSet::Valid) => {
                (creds.valid_email.as_str(), creds.valid_password.as_str())
            }
            CredentialsRef::Named(CredentialSet::InvalidEmail) => {
                (creds.invalid_email.as_str(), creds.valid_password.as_str())
            }
            CredentialsRef::Named(CredentialSet::InvalidPassword) => {
                (creds.valid_email.as_str(), creds.invalid_password.as_str())
            }
            CredentialsRef::Explicit { email, password } => (email.as_str(), password.as_str()),
        }
    }

    fn fixture(&self, name: &Path) -> PathBuf {
        resolve_fixture(&self.fixtures_dir, name)
    }

    async fn add_pet(
        &self,
        key: &SessionKey,
        fields: &PetFields,
        photo: Option<&Path>,
    ) -> Result<ApiResponse> {
        match photo {
            Some(photo) => {
                self.client
                    .add_new_pet(key, fields, &self.fixture(photo))
                    .await
            }
            None => self.client.add_new_pet_without_photo(key, fields).await,
        }
    }

    /// List pets for a selection step; anything but a 200 listing is fatal
    async fn list_for_selection(&self, key: &SessionKey, filter: PetFilter) -> Result<Vec<Pet>> {
        let response = self.client.get_list_of_pets(key, filter).await?;
        if !response.is_success() {
            return Err(Error::Precondition(format!(
                "listing {} pets returned {}",
                filter, response.status
            )));
        }
        response.pets().ok_or_else(|| {
            Error::Precondition(format!("listing {} pets returned no pets field", filter))
        })
    }

    fn check(
        &self,
        response: &ApiResponse,
        expect: Option<&ResponseExpectation>,
        state: &ScenarioState,
    ) -> Result<()> {
        if self.verbose {
            println!(
                "      {} {}",
                response.status.to_string().cyan(),
                shorten(&response.body.to_string(), 200).dimmed()
            );
        }
        match expect {
            Some(expect) => check_response(response, expect, state.selected.as_ref()),
            None => Ok(()),
        }
    }
}

/// Check a response against an expectation
///
/// `selected` is the pet captured by the last selection step, used by the
/// comparisons against earlier state.
pub fn check_response(
    response: &ApiResponse,
    expect: &ResponseExpectation,
    selected: Option<&Pet>,
) -> Result<()> {
    if let Some(expected) = expect.status {
        if response.status != expected {
            return Err(Error::TestAssertion(format!(
                "Expected status {}, got {}: {}",
                expected,
                response.status,
                shorten(&response.body.to_string(), 200)
            )));
        }
    }

    if let Some(unexpected) = expect.status_not {
        if response.status == unexpected {
            return Err(Error::TestAssertion(format!(
                "Expected a status other than {}",
                unexpected
            )));
        }
    }

    if let Some(field) = &expect.has_field {
        if !response.has_field(field) {
            return Err(Error::TestAssertion(format!(
                "Expected field '{}' in response: {}",
                field,
                shorten(&response.body.to_string(), 200)
            )));
        }
    }

    if let Some(field) = &expect.lacks_field {
        if response.has_field(field) {
            return Err(Error::TestAssertion(format!(
                "Expected no field '{}' in response",
                field
            )));
        }
    }

    for (field, expected) in &expect.fields {
        match response.field_str(field) {
            Some(actual) if actual == expected.0 => {}
            Some(actual) => {
                return Err(Error::TestAssertion(format!(
                    "Field '{}': expected '{}', got '{}'",
                    field,
                    shorten(&expected.0, 60),
                    shorten(&actual, 60)
                )));
            }
            None => {
                return Err(Error::TestAssertion(format!(
                    "Field '{}' not found in response",
                    field
                )));
            }
        }
    }

    if !expect.changed_from_selected.is_empty() {
        let pet = require_selected(selected)?;
        for field in &expect.changed_from_selected {
            let before = selected_field(pet, field)?;
            let after = response.field_str(field).ok_or_else(|| {
                Error::TestAssertion(format!("Field '{}' not found in response", field))
            })?;
            if after == before {
                return Err(Error::TestAssertion(format!(
                    "Field '{}' did not change from '{}'",
                    field,
                    shorten(before, 60)
                )));
            }
        }
    }

    let needs_listing =
        expect.min_pets.is_some() || expect.excludes_selected || expect.pet_at.is_some();
    if !needs_listing {
        return Ok(());
    }

    let pets = response
        .pets()
        .ok_or_else(|| Error::TestAssertion("Response has no pets listing".into()))?;

    if let Some(min) = expect.min_pets {
        if pets.len() < min {
            return Err(Error::TestAssertion(format!(
                "Expected at least {} pets, got {}",
                min,
                pets.len()
            )));
        }
    }

    if expect.excludes_selected {
        let pet = require_selected(selected)?;
        if pets.iter().any(|p| p.id == pet.id) {
            return Err(Error::TestAssertion(format!(
                "Pet {} is still listed",
                pet.id
            )));
        }
    }

    if let Some(pet_at) = &expect.pet_at {
        let pet = require_selected(selected)?;
        let listed = pets.get(pet_at.index).ok_or_else(|| {
            Error::TestAssertion(format!(
                "Pet {} does not exist (only {} pets)",
                pet_at.index,
                pets.len()
            ))
        })?;
        for field in &pet_at.differs_from_selected {
            let before = selected_field(pet, field)?;
            let now = selected_field(listed, field)?;
            if now == before {
                return Err(Error::TestAssertion(format!(
                    "Pet {}: field '{}' is still '{}'",
                    pet_at.index,
                    field,
                    shorten(now, 60)
                )));
            }
        }
    }

    Ok(())
}

fn require_selected(selected: Option<&Pet>) -> Result<&Pet> {
    selected.ok_or_else(|| {
        Error::Precondition("expectation compares against a selected pet, but none is".into())
    })
}

fn selected_field<'a>(pet: &'a Pet, field: &str) -> Result<&'a str> {
    pet.field(field)
        .ok_or_else(|| Error::Config(format!("Unknown pet field '{}'", field)))
}

fn describe_credentials(credentials: &CredentialsRef) -> String {
    match credentials {
        CredentialsRef::Named(CredentialSet::Valid) => "valid".to_string(),
        CredentialsRef::Named(CredentialSet::InvalidEmail) => "invalid email".to_string(),
        CredentialsRef::Named(CredentialSet::InvalidPassword) => "invalid password".to_string(),
        CredentialsRef::Explicit { email, .. } => email.clone(),
    }
}

fn photo_label(photo: Option<&Path>) -> String {
    photo
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "no photo".to_string())
}

/// Truncate on a char boundary for display
fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn print_summary(summary: &SuiteSummary) {
    println!("\n{}", "Summary:".cyan().bold());
    for result in &summary.results {
        let defect = if result.known_defect {
            " [known defect]".yellow().to_string()
        } else {
            String::new()
        };
        if result.passed() {
            println!("  {} {}{}", "✓".green(), result.name, defect);
        } else {
            println!(
                "  {} {}{} ({}/{} steps): {}",
                "✗".red(),
                result.name,
                defect,
                result.steps_run,
                result.steps_total,
                result.outcome
            );
        }
    }

    let line = format!(
        "{} passed, {} failed, {} total",
        summary.passed(),
        summary.failed(),
        summary.results.len()
    );
    if summary.all_passed() {
        println!("\n{}\n", line.green().bold());
    } else {
        println!("\n{}\n", line.red().bold());
    }
}
