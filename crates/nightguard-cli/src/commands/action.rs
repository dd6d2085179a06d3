//! Action commands - invoke vehicle actions such as lock and unlock

use anyhow::{Context, Result};
use nightguard_client::{Resource, VehicleClient};

use crate::output::OutputContext;

/// Invoke an action, optionally fetching the result of an accepted request
pub async fn action(
    car: &VehicleClient,
    name: &str,
    follow: bool,
    ctx: &OutputContext,
) -> Result<()> {
    if follow {
        let result = car
            .invoke_action_and_follow(name)
            .await
            .with_context(|| format!("Failed to invoke {} and fetch its result", name))?;
        ctx.success(&format!("Action {} finished with status {}", name, result.status));
        ctx.print_signals(&result);
        return Ok(());
    }

    let response = car
        .invoke_action(name)
        .await
        .with_context(|| format!("Failed to invoke {}", name))?;

    if response.is_accepted() {
        ctx.info(&format!(
            "Action {} accepted (operationId {}): {}",
            name,
            response.operation_id.as_deref().unwrap_or("-"),
            response.error_message()
        ));
    } else {
        ctx.success(&format!("Action {} completed", name));
        ctx.print_signals(&response);
    }
    Ok(())
}

/// Show window status, then run a follow-on action if one was given
pub async fn windows(car: &VehicleClient, then: Option<&str>, ctx: &OutputContext) -> Result<()> {
    super::read(car, Resource::Windows, ctx).await?;

    if let Some(name) = then {
        action(car, name, false, ctx).await?;
    }
    Ok(())
}
