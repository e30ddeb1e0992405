use crate::utils::{self, RegexPatternSetState};
use anyhow::Context as _;
use colored::Colorize;
use std::time::Instant;
use wafflow_cloud::{ActionResult, ActionType, Resource, StateDocument, StateManager};
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
    let (doc, existing) = utils::load_record(state, address).await?;

    if let Some(id) = existing.as_ref().and_then(|r| r.id()) {
        anyhow::bail!(
            "{} already exists (id: {}); use update or apply instead",
            address,
            id
        );
    }

    println!("{}", format!("Creating {}...", address).blue());
    utils::print_summary(&config);

    let record = create_and_save(resource, state, doc, address, config).await?;

    Ok(ActionResult::new(ActionType::Create, address)
        .with_resource_id(record.id())
        .with_duration(started))
}

/// Create the resource and record whatever exists afterwards
///
/// A create that succeeded remotely but failed while refreshing still
/// leaves an identifier behind, which is saved before the error is returned.
pub(crate) async fn create_and_save<R>(
    resource: &R,
    state: &StateManager,
    doc: StateDocument,
    address: &str,
    config: RegexPatternSetConfig,
) -> anyhow::Result<RegexPatternSetState>
where
    R: Resource<Config = RegexPatternSetConfig>,
{
    let mut record = RegexPatternSetState::new(config);
    let outcome = resource.create(&mut record).await;

    if !record.is_absent() {
        utils::save_record(state, doc, address, &record).await?;
    } else if doc.resources.contains_key(address) {
        utils::remove_record(state, doc, address).await?;
    }

    outcome.with_context(|| format!("failed to create {}", address))?;
    Ok(record)
}
