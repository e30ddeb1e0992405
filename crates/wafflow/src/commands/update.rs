use crate::utils::{self, RegexPatternSetState};
use colored::Colorize;
use std::time::Instant;
use wafflow_cloud::{ActionResult, ActionType, CloudError, Resource, StateManager};
use wafflow_cloud_aws::RegexPatternSetConfig;

pub async fn handle<R>(
    resource: &R,
    state: &StateManager,
    address: &str,
    config: RegexPatternSetConfig,
) -> anyhow::Result<ActionResult>
where
    R: Resource<Config = RegexPatternSetConfig>,
{
    let started = Instant::now();
    let (doc, prior) = utils::require_record(state, address).await?;

    if prior.is_absent() {
        anyhow::bail!("{} has no remote id; use create or apply instead", address);
    }

    println!("{}", format!("Updating {}...", address).blue());
    utils::print_summary(&config);

    let mut record = RegexPatternSetState::new(config);
    match resource.update(&mut record, &prior).await {
        Ok(()) => {}
        Err(e @ CloudError::RequiresReplacement { .. }) => {
            anyhow::bail!("{}; use `wafflow apply --yes` to replace {}", e, address)
        }
        Err(e) => return Err(e.into()),
    }

    if record.is_absent() {
        utils::remove_record(state, doc, address).await?;
        anyhow::bail!("{} disappeared while it was being updated", address);
    }
    utils::save_record(state, doc, address, &record).await?;

    Ok(ActionResult::new(ActionType::Update, address)
        .with_resource_id(record.id())
        .with_duration(started))
}
