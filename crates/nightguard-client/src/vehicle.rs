//! Per-vehicle operations on top of [`ApiClient`]

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::client::ApiClient;
use crate::config::ServiceConfig;
use crate::error::{NightguardError, Result};
use crate::types::{ApiResponse, VehicleDetails};
use crate::vin::Vin;

/// Telemetry resources that can be read from a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Details,
    Environment,
    Brakes,
    Diagnostics,
    Doors,
    Engine,
    Fuel,
    Odometer,
    Statistics,
    Tyres,
    Warnings,
    Windows,
}

impl Resource {
    pub const ALL: [Resource; 12] = [
        Resource::Details,
        Resource::Environment,
        Resource::Brakes,
        Resource::Diagnostics,
        Resource::Doors,
        Resource::Engine,
        Resource::Fuel,
        Resource::Odometer,
        Resource::Statistics,
        Resource::Tyres,
        Resource::Warnings,
        Resource::Windows,
    ];

    /// Endpoint name used for the media-type lookup
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Environment => "environment",
            Self::Brakes => "brakes",
            Self::Diagnostics => "diagnostics",
            Self::Doors => "doors",
            Self::Engine => "engine",
            Self::Fuel => "fuel",
            Self::Odometer => "odometer",
            Self::Statistics => "statistics",
            Self::Tyres => "tyres",
            Self::Warnings => "warnings",
            Self::Windows => "windows",
        }
    }

    /// Request path below the base URI. Details live at the vehicle root.
    pub fn path(&self, vin: &Vin) -> String {
        match self {
            Self::Details => format!("/{}", vin),
            other => format!("/{}/{}", vin, other.endpoint()),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for Resource {
    type Err = NightguardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.endpoint() == s)
            .ok_or_else(|| NightguardError::UnmappedEndpoint(s.to_string()))
    }
}

/// Client bound to one vehicle whose VIN has been confirmed by the API
#[derive(Debug, Clone)]
pub struct VehicleClient {
    api: ApiClient,
    vin: Vin,
}

impl VehicleClient {
    /// Build an [`ApiClient`] from `config` and bind it to `vin`
    pub async fn connect(config: ServiceConfig, vin: &str) -> Result<Self> {
        let api = ApiClient::new(config)?;
        Self::with_api(api, vin).await
    }

    /// Bind an existing client to `vin`.
    ///
    /// Fetches the vehicle list and compares the first listed VIN with the
    /// requested one, ignoring case. A mismatch ends the session.
    #[instrument(skip(api))]
    pub async fn with_api(api: ApiClient, vin: &str) -> Result<Self> {
        let vin = Vin::parse(vin)?;
        let vehicles = api.vehicles().await?;

        let Some(first) = vehicles.first() else {
            api.terminate();
            return Err(NightguardError::NoVehicles);
        };
        debug!("VIN check: {} = {}", vin, first.vin);

        if !vin.matches(&first.vin) {
            api.terminate();
            return Err(NightguardError::VinMismatch {
                expected: vin.to_string(),
                actual: first.vin.clone(),
            });
        }

        Ok(Self { api, vin })
    }

    pub fn vin(&self) -> &Vin {
        &self.vin
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Match an endpoint name to its media type; `None` when unmapped
    pub fn get_service_data(&self, endpoint: &str) -> Option<&str> {
        self.api.get_service_data(endpoint)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read any telemetry resource
    #[instrument(skip(self), fields(vin = %self.vin))]
    pub async fn read(&self, resource: Resource) -> Result<ApiResponse> {
        let response = self
            .api
            .get_endpoint(&resource.path(&self.vin), resource.endpoint())
            .await?;
        debug!("{}: {}", resource, response.data);
        Ok(response)
    }

    /// Details about the vehicle such as model and model year
    pub async fn details(&self) -> Result<ApiResponse> {
        self.read(Resource::Details).await
    }

    /// Typed view of [`details`](Self::details)
    pub async fn vehicle_details(&self) -> Result<VehicleDetails> {
        self.details().await?.data_as()
    }

    /// Environment values such as external temperature
    pub async fn environment(&self) -> Result<ApiResponse> {
        self.read(Resource::Environment).await
    }

    /// Brake status, e.g. brake fluid level
    pub async fn brakes(&self) -> Result<ApiResponse> {
        self.read(Resource::Brakes).await
    }

    /// Service status, service trigger, distance and time to service
    pub async fn diagnostics(&self) -> Result<ApiResponse> {
        self.read(Resource::Diagnostics).await
    }

    /// Door, hood, tailgate and central lock status
    pub async fn doors(&self) -> Result<ApiResponse> {
        self.read(Resource::Doors).await
    }

    /// Engine running state, oil and coolant levels
    pub async fn engine(&self) -> Result<ApiResponse> {
        self.read(Resource::Engine).await
    }

    /// Fuel amount in liters
    pub async fn fuel(&self) -> Result<ApiResponse> {
        self.read(Resource::Fuel).await
    }

    /// Odometer in kilometers
    pub async fn odometer(&self) -> Result<ApiResponse> {
        self.read(Resource::Odometer).await
    }

    /// Average consumption, average speed and trip meters
    pub async fn statistics(&self) -> Result<ApiResponse> {
        self.read(Resource::Statistics).await
    }

    /// Tyre pressure status per wheel
    pub async fn tyres(&self) -> Result<ApiResponse> {
        self.read(Resource::Tyres).await
    }

    /// Warnings such as bulb failures
    pub async fn warnings(&self) -> Result<ApiResponse> {
        self.read(Resource::Warnings).await
    }

    /// Window status per window
    pub async fn windows(&self) -> Result<ApiResponse> {
        self.read(Resource::Windows).await
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Invoke an action such as `lock` or `unlock`.
    ///
    /// Sends the endpoint's media type as `content-Type` and the media type
    /// of `commands/<endpoint>` as `accept`. Both must be configured before
    /// anything is sent. A 202 answer carries the `operationId` to pass to
    /// [`fetch_operation`](Self::fetch_operation).
    #[instrument(skip(self), fields(vin = %self.vin))]
    pub async fn invoke_action(&self, endpoint: &str) -> Result<ApiResponse> {
        let content_type = self.api.media_type(endpoint)?;
        let accept = self.api.command_media_type(endpoint)?;

        let path = format!("/{}/{}", self.vin, endpoint);
        self.api.post(&path, content_type, accept).await
    }

    /// Fetch the result of an accepted action
    #[instrument(skip(self), fields(vin = %self.vin))]
    pub async fn fetch_operation(&self, endpoint: &str, operation_id: &str) -> Result<ApiResponse> {
        let accept = self.api.command_media_type(endpoint)?;
        let url = self
            .api
            .url_with_segment(&format!("/{}/{}", self.vin, endpoint), operation_id)?;
        self.api.get_url(url, accept).await
    }

    /// Invoke an action and, if it was accepted, fetch its result once
    pub async fn invoke_action_and_follow(&self, endpoint: &str) -> Result<ApiResponse> {
        let response = self.invoke_action(endpoint).await?;
        if !response.is_accepted() {
            return Ok(response);
        }

        let operation_id = response
            .operation_id
            .as_deref()
            .ok_or_else(|| NightguardError::MissingOperationId(endpoint.to_string()))?;
        self.fetch_operation(endpoint, operation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths() {
        let vin = Vin::parse("yv4952na4f120demo").unwrap();
        assert_eq!(Resource::Details.path(&vin), "/YV4952NA4F120DEMO");
        assert_eq!(Resource::Tyres.path(&vin), "/YV4952NA4F120DEMO/tyres");
    }

    #[test]
    fn test_resource_from_str() {
        for resource in Resource::ALL {
            assert_eq!(resource.endpoint().parse::<Resource>().unwrap(), resource);
        }
        assert!("lock".parse::<Resource>().is_err());
    }
}
