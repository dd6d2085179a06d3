//! NightGuard Client Library
//!
//! Typed client for a connected-vehicle telemetry REST API: every request
//! carries the bearer token and API key, resources are selected by
//! vendor-specific media types, and the status embedded in each response
//! body decides whether the session may continue.
//!
//! # Example
//!
//! ```rust,no_run
//! use nightguard_client::{ServiceConfig, VehicleClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServiceConfig::load_from("service_params.json")?;
//!
//!     // Fails unless the account's first vehicle has this VIN
//!     let car = VehicleClient::connect(config, "YV4952NA4F120DEMO").await?;
//!
//!     let doors = car.doors().await?;
//!     println!("{}", doors.data);
//!
//!     // Actions may answer 202; follow up once with the operationId
//!     let result = car.invoke_action_and_follow("lock").await?;
//!     println!("{}", result.data);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides an in-process mock of the API:
//!
//! ```rust,ignore
//! use nightguard_client::testing::{MockVehicleApi, TestServer};
//!
//! let api = MockVehicleApi::new("/").vehicles(&["YV4952NA4F120DEMO"]);
//! let server = TestServer::start(api.router()).await?;
//! ```

mod client;
pub mod config;
mod error;
pub mod testing;
mod types;
pub mod units;
mod vehicle;
mod vin;

pub use client::{ApiClient, API_KEY_HEADER};
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{NightguardError, Result};
pub use types::*;
pub use units::UnitSystem;
pub use vehicle::{Resource, VehicleClient};
pub use vin::Vin;
