use crate::utils;
use colored::Colorize;
use std::time::Instant;
use wafflow_cloud::{ActionResult, ActionType, Resource, StateManager};
use wafflow_cloud_aws::RegexPatternSetConfig;

pub async fn handle<R>(
    resource: &R,
    state: &StateManager,
    address: &str,
    import_id: &str,
) -> anyhow::Result<ActionResult>
where
    R: Resource<Config = RegexPatternSetConfig>,
{
    let started = Instant::now();
    let (doc, existing) = utils::load_record(state, address).await?;

    if let Some(id) = existing.as_ref().and_then(|r| r.id()) {
        anyhow::bail!("{} is already managed (id: {})", address, id);
    }

    println!("{}", format!("Importing {} as {}...", import_id, address).blue());

    let mut record = resource
        .import(import_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("import of {} returned no resources", import_id))?;

    resource.read(&mut record).await?;
    if record.is_absent() {
        anyhow::bail!("cannot import non-existent remote object ({})", import_id);
    }

    utils::print_summary(&record.config);
    utils::save_record(state, doc, address, &record).await?;

    Ok(ActionResult::new(ActionType::Import, address)
        .with_resource_id(record.id())
        .with_duration(started))
}
