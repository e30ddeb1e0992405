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
    let (doc, record) = utils::require_record(state, address).await?;

    if !record.is_absent() {
        println!("{}", format!("Deleting {}...", address).yellow());
        resource.delete(&record).await?;
    }
    utils::remove_record(state, doc, address).await?;

    Ok(ActionResult::new(ActionType::Delete, address)
        .with_resource_id(record.id())
        .with_duration(started))
}
