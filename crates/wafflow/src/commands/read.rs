use crate::utils;
use colored::Colorize;
use std::time::Instant;
use wafflow_cloud::{ActionResult, ActionType, Resource, StateManager};
use wafflow_cloud_aws::RegexPatternSetConfig;

pub async fn handle<R>(
    resource: &R,
    state: &StateManager,
    address: &str,
) -> anyhow::Result<ActionResult>
where
    R: Resource<Config = RegexPatternSetConfig>,
{
    let started = Instant::now();
    let (doc, mut record) = utils::require_record(state, address).await?;

    println!("{}", format!("Refreshing {}...", address).blue());
    resource.read(&mut record).await?;

    if record.is_absent() {
        println!(
            "{}",
            format!("⚠ {} no longer exists; removing it from state", address).yellow()
        );
        utils::remove_record(state, doc, address).await?;
        return Ok(ActionResult::new(ActionType::Read, address).with_duration(started));
    }

    utils::print_summary(&record.config);
    utils::save_record(state, doc, address, &record).await?;

    Ok(ActionResult::new(ActionType::Read, address)
        .with_resource_id(record.id())
        .with_duration(started))
}
