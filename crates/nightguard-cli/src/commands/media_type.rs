//! Media-type command - resolve an endpoint name without calling the API

use anyhow::{bail, Result};
use nightguard_client::ApiClient;

use crate::output::OutputContext;

/// Show the media type configured for an endpoint
pub fn media_type(client: &ApiClient, endpoint: &str, ctx: &OutputContext) -> Result<()> {
    let Some(media_type) = client.get_service_data(endpoint) else {
        bail!("No media type configured for endpoint '{}'", endpoint);
    };

    ctx.print_kv(&[
        ("Endpoint", endpoint.to_string()),
        ("Media type", media_type.to_string()),
    ]);
    Ok(())
}
