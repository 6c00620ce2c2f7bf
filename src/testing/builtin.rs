//! Built-in scenario suite
//!
//! One scenario per behavior of the PetFriends API the suite tracks. The
//! YAML sources live in `scenarios/` and are compiled into the binary.

use crate::common::Result;

use super::config::TestScenario;

macro_rules! scenario {
    ($file:literal) => {
        ($file, include_str!(concat!("../../scenarios/", $file)))
    };
}

/// Embedded scenario sources, in execution order
pub const BUILTIN_SOURCES: &[(&str, &str)] = &[
    scenario!("01_api_key_valid_user.yaml"),
    scenario!("02_list_all_pets.yaml"),
    scenario!("03_add_pet_with_photo.yaml"),
    scenario!("04_delete_own_pet.yaml"),
    scenario!("05_update_own_pet_info.yaml"),
    scenario!("06_add_pet_without_photo.yaml"),
    scenario!("07_replace_photo.yaml"),
    scenario!("08_api_key_invalid_password.yaml"),
    scenario!("09_api_key_invalid_email.yaml"),
    scenario!("10_replace_photo_over_6mb.yaml"),
    scenario!("11_add_pet_255_char_name.yaml"),
    scenario!("12_add_pet_negative_age.yaml"),
    scenario!("13_add_pet_empty_name.yaml"),
    scenario!("14_add_pet_empty_name_and_type.yaml"),
    scenario!("15_delete_foreign_pet.yaml"),
    scenario!("16_replace_photo_png.yaml"),
    scenario!("17_replace_photo_jpeg.yaml"),
    scenario!("18_replace_photo_gif.yaml"),
];

/// Parse the built-in suite
pub fn builtin_scenarios() -> Result<Vec<TestScenario>> {
    BUILTIN_SOURCES
        .iter()
        .map(|(file, source)| TestScenario::parse(file, source))
        .collect()
}

/// Keep only scenarios whose name is listed; an empty list keeps all
pub fn select(scenarios: Vec<TestScenario>, only: &[String]) -> Vec<TestScenario> {
    if only.is_empty() {
        return scenarios;
    }
    scenarios
        .into_iter()
        .filter(|s| only.iter().any(|name| name == &s.name))
        .collect()
}
