#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;
use crate::notifier::Notifier;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notifier;
pub mod workflow;

pub fn build() -> Rocket<Build> {
    rocket::custom(config::figment())
        .mount("/", api::routes())
        .register("/", api::catchers())
        .manage(Notifier::new())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(LoggerFairing)
}

/// A server over the given stores, skipping config loading and database
/// setup. No admin is provisioned.
#[cfg(test)]
pub(crate) fn rocket_for_stores(
    config: config::Config,
    stores: model::store::Stores,
) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .manage(config)
        .manage(stores)
        .manage(Notifier::new())
        .attach(LoggerFairing)
}
