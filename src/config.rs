use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    figment::{providers::Env, Figment},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{mongodb::ensure_indexes_exist, store::Stores};
use crate::workflow::accounts::ensure_admin_exists;

/// The configuration source: Rocket's own (`Rocket.toml` and `ROCKET_*`
/// variables), plus the bare `JWT_SECRET`, `DB_URI` and `PORT` variables.
pub fn figment() -> Figment {
    rocket::Config::figment().merge(Env::raw().only(&["jwt_secret", "db_uri", "port"]))
}

/// Application configuration, derived from `Rocket.toml` and environment
/// variables. This struct becomes managed state and can be inspected by
/// any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    #[serde(default = "default_auth_ttl")]
    auth_ttl: u32,
    #[serde(default)]
    default_admin: DefaultAdmin,
    // secrets
    jwt_secret: String,
}

fn default_auth_ttl() -> u32 {
    3600
}

impl Config {
    /// Valid lifetime of session tokens, for every way of obtaining one.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// The admin account provisioned when no admin exists.
    pub fn default_admin(&self) -> &DefaultAdmin {
        &self.default_admin
    }
}

/// Details of the admin created on first boot.
///
/// The built-in password is public knowledge, so the account is flagged
/// for mandatory rotation and cannot perform admin actions until then.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultAdmin {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub national_id: String,
    pub password: String,
}

impl Default for DefaultAdmin {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            age: 30,
            email: "admin@example.com".to_string(),
            mobile: "1234567890".to_string(),
            address: "Admin Address".to_string(),
            national_id: "000000000000".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the database fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Where users and candidates are kept.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    #[default]
    Mongodb,
    /// Nothing survives a restart; meant for local development.
    Memory,
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    #[serde(default)]
    storage: Storage,
    #[serde(default = "default_db_name")]
    db_name: String,
    // secrets
    db_uri: Option<String>,
}

fn default_db_name() -> String {
    "voting".to_string()
}

/// A fairing that loads the storage config, connects to the database if
/// there is one, ensures an admin exists, and places the [`Stores`] into
/// managed state. Must be attached after [`ConfigFairing`].
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "Stores",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let stores = match config.storage {
            Storage::Memory => {
                warn!("Using in-memory storage, nothing will persist across restarts");
                Stores::in_memory()
            }
            Storage::Mongodb => {
                let Some(db_uri) = config.db_uri else {
                    error!("`db_uri` must be set when using MongoDB storage");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                let client = match MongoClient::with_uri_str(db_uri).await {
                    Ok(client) => client,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                let db = client.database(&config.db_name);

                if let Err(e) = ensure_indexes_exist(&db).await {
                    error!("Failed to create database indexes: {e}");
                    return Err(rocket);
                }
                info!("...database connection online!");
                Stores::mongodb(&db)
            }
        };

        // Ensure there is at least one admin user.
        let default_admin = match rocket.state::<Config>() {
            Some(app_config) => app_config.default_admin().clone(),
            None => {
                error!("Application config must be loaded before the stores");
                return Err(rocket);
            }
        };
        if let Err(e) = ensure_admin_exists(stores.users.as_ref(), &default_admin).await {
            error!("Failed to provision the default admin: {e}");
            return Err(rocket);
        }

        rocket = rocket.manage(stores);
        Ok(rocket)
    }
}
