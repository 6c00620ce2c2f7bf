//! CLI command handling
//!
//! Dispatches CLI commands to the API client or the scenario runner and
//! formats output.

use colored::Colorize;

use crate::api::{ApiResponse, PetFields, PetFilter, PetFriendsClient, SessionKey};
use crate::commands::{Commands, PetCommands};
use crate::common::config::{Config, CONFIG_TEMPLATE};
use crate::common::{paths, Error, Result};
use crate::testing::{self, Runner, TestScenario};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run {
            files,
            only,
            verbose,
        } => {
            let scenarios = if files.is_empty() {
                testing::builtin_scenarios()?
            } else {
                files
                    .iter()
                    .map(|path| TestScenario::load(path))
                    .collect::<Result<Vec<_>>>()?
            };
            let scenarios = testing::select(scenarios, &only);
            if scenarios.is_empty() {
                return Err(Error::Config("No scenarios matched --only".to_string()));
            }

            let runner = Runner::new(
                client(config)?,
                config.credentials()?,
                config.fixtures.dir.clone(),
            )
            .verbose(verbose);

            tracing::info!(
                base_url = %config.service.base_url,
                scenarios = scenarios.len(),
                "running scenarios"
            );
            let summary = runner.run_all(&scenarios).await;

            if summary.all_passed() {
                Ok(())
            } else {
                Err(Error::TestAssertion(format!(
                    "{} of {} scenarios failed",
                    summary.failed(),
                    summary.results.len()
                )))
            }
        }

        Commands::Scenarios => {
            for scenario in testing::builtin_scenarios()? {
                let defect = if scenario.known_defect.is_some() {
                    " [known defect]".yellow().to_string()
                } else {
                    String::new()
                };
                println!("{}{}", scenario.name.bold(), defect);
                if let Some(desc) = &scenario.description {
                    println!("    {}", desc.dimmed());
                }
            }
            Ok(())
        }

        Commands::Key => {
            let creds = config.credentials()?;
            let response = client(config)?
                .get_api_key(&creds.valid_email, &creds.valid_password)
                .await?;
            print_response(&response);
            Ok(())
        }

        Commands::Pets(pet_cmd) => {
            let client = client(config)?;
            let key = authenticate(&client, config).await?;

            match pet_cmd {
                PetCommands::List { mine } => {
                    let filter = if mine {
                        PetFilter::MyPets
                    } else {
                        PetFilter::All
                    };
                    let response = client.get_list_of_pets(&key, filter).await?;
                    match response.pets() {
                        Some(pets) if response.is_success() => {
                            if pets.is_empty() {
                                println!("No pets");
                            }
                            for pet in &pets {
                                println!(
                                    "{}  {}  {}  {}",
                                    pet.id.dimmed(),
                                    pet.name.bold(),
                                    pet.animal_type,
                                    pet.age
                                );
                            }
                        }
                        _ => print_response(&response),
                    }
                }

                PetCommands::Add {
                    name,
                    animal_type,
                    age,
                    photo,
                } => {
                    let fields = PetFields::new(name, animal_type, age);
                    let response = match photo {
                        Some(photo) => client.add_new_pet(&key, &fields, &photo).await?,
                        None => client.add_new_pet_without_photo(&key, &fields).await?,
                    };
                    print_response(&response);
                }

                PetCommands::Update {
                    id,
                    name,
                    animal_type,
                    age,
                } => {
                    let fields = PetFields::new(name, animal_type, age);
                    let response = client.update_pet_info(&key, &id, &fields).await?;
                    print_response(&response);
                }

                PetCommands::Photo { id, path } => {
                    let response = client.update_pet_photo(&key, &id, &path).await?;
                    print_response(&response);
                }

                PetCommands::Delete { id } => {
                    let response = client.delete_pet(&key, &id).await?;
                    print_response(&response);
                }
            }
            Ok(())
        }

        Commands::Config { init } => {
            let path = paths::config_path().ok_or_else(|| {
                Error::Config("No configuration directory on this platform".to_string())
            })?;

            if init {
                if path.exists() {
                    println!("Configuration already exists: {}", path.display());
                } else {
                    paths::ensure_config_dir()?;
                    std::fs::write(&path, CONFIG_TEMPLATE)?;
                    println!("Wrote configuration template: {}", path.display());
                }
            } else {
                let state = if path.exists() { "" } else { " (not created)" };
                println!("{}{}", path.display(), state.dimmed());
            }
            Ok(())
        }
    }
}

fn client(config: &Config) -> Result<PetFriendsClient> {
    PetFriendsClient::with_timeout(&config.service.base_url, config.service.timeout())
}

/// Get a session key with the configured valid credentials
async fn authenticate(client: &PetFriendsClient, config: &Config) -> Result<SessionKey> {
    let creds = config.credentials()?;
    let response = client
        .get_api_key(&creds.valid_email, &creds.valid_password)
        .await?;

    response.session_key().ok_or_else(|| Error::Authentication {
        status: response.status,
        body: response.body.to_string(),
    })
}

fn print_response(response: &ApiResponse) {
    let status = response.status.to_string();
    let status = if response.is_success() {
        status.green()
    } else {
        status.red()
    };
    println!("Status: {}", status);

    match response.body.as_json() {
        Some(json) => match serde_json::to_string_pretty(json) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", json),
        },
        None => println!("{}", response.body),
    }
}
