//! Read commands - query vehicle telemetry resources

use anyhow::{Context, Result};
use nightguard_client::{Resource, VehicleClient, VehicleDetails};

use crate::output::OutputContext;

/// Read one telemetry resource and print its signals
pub async fn read(car: &VehicleClient, resource: Resource, ctx: &OutputContext) -> Result<()> {
    let response = car
        .read(resource)
        .await
        .with_context(|| format!("Failed to read {}", resource))?;

    if response.is_accepted() {
        ctx.warn(&format!(
            "{} request accepted but not completed: {}",
            resource,
            response.error_message()
        ));
    }

    ctx.print_signals(&response);
    Ok(())
}

/// Show vehicle details with a model summary line
pub async fn details(car: &VehicleClient, ctx: &OutputContext) -> Result<()> {
    let response = car.details().await.context("No car info found")?;

    if let Ok(details) = response.data_as::<VehicleDetails>() {
        ctx.info(&format!("Model:\t{}", details.summary()));
    }

    ctx.print_signals(&response);
    Ok(())
}
