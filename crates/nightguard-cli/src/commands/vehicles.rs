//! Vehicles command - list the vehicles on the account

use anyhow::Result;
use nightguard_client::ApiClient;

use crate::output::{OutputContext, VehicleRow};

/// List the vehicles registered on the account
pub async fn vehicles(client: &ApiClient, ctx: &OutputContext) -> Result<()> {
    let vehicles = client.vehicles().await?;

    let rows: Vec<VehicleRow> = vehicles
        .into_iter()
        .map(|v| VehicleRow { vin: v.vin })
        .collect();

    ctx.print(&rows);
    Ok(())
}
