use super::create::create_and_save;
use crate::utils::{self, RegexPatternSetState};
use colored::Colorize;
use std::time::Instant;
use wafflow_cloud::{ActionResult, ActionType, Resource, StateManager};
use wafflow_cloud_aws::{KeyValueTags, RegexPatternSetConfig};

/// Action needed to move `prior` to `desired`
pub fn plan<R>(resource: &R, prior: &RegexPatternSetConfig, desired: &RegexPatternSetConfig) -> ActionType
where
    R: Resource<Config = RegexPatternSetConfig>,
{
    if resource.requires_replacement(prior, desired) {
        ActionType::Replace
    } else if in_sync(prior, desired) {
        ActionType::NoOp
    } else {
        ActionType::Update
    }
}

fn in_sync(prior: &RegexPatternSetConfig, desired: &RegexPatternSetConfig) -> bool {
    let mut desired = desired.clone();
    desired.arn = prior.arn.clone();
    desired.tags = KeyValueTags::from(&desired.tags).ignore_aws().into_map();
    &desired == prior
}

pub async fn handle<R>(
    resource: &R,
    state: &StateManager,
    address: &str,
    config: RegexPatternSetConfig,
    allow_replace: bool,
) -> anyhow::Result<ActionResult>
where
    R: Resource<Config = RegexPatternSetConfig>,
{
    let started = Instant::now();
    resource.validate(&config)?;

    let (mut doc, prior) = utils::load_record(state, address).await?;

    let mut prior = match prior {
        Some(prior) if !prior.is_absent() => prior,
        _ => {
            println!("{}", format!("Creating {}...", address).blue());
            utils::print_summary(&config);
            let record = create_and_save(resource, state, doc, address, config).await?;
            return Ok(ActionResult::new(ActionType::Create, address)
                .with_resource_id(record.id())
                .with_duration(started));
        }
    };

    resource.read(&mut prior).await?;
    if prior.is_absent() {
        println!(
            "{}",
            format!("⚠ {} no longer exists; creating it again", address).yellow()
        );
        let record = create_and_save(resource, state, doc, address, config).await?;
        return Ok(ActionResult::new(ActionType::Create, address)
            .with_resource_id(record.id())
            .with_duration(started));
    }

    let action = plan(resource, &prior.config, &config);
    match action {
        ActionType::NoOp => {
            println!("{}", format!("{} is up to date", address).green());
            utils::save_record(state, doc, address, &prior).await?;
            Ok(ActionResult::new(ActionType::NoOp, address)
                .with_resource_id(prior.id())
                .with_duration(started))
        }
        ActionType::Replace => {
            let attribute = resource
                .replacement_reason(&prior.config, &config)
                .unwrap_or("an immutable attribute");
            if !allow_replace {
                anyhow::bail!(
                    "changing {} requires replacing {}; rerun with --yes to delete and recreate it",
                    attribute,
                    address
                );
            }

            println!(
                "{}",
                format!("Replacing {} ({} changed)...", address, attribute).yellow()
            );
            resource.delete(&prior).await?;
            doc.remove_resource(address);
            state.save(&doc).await?;

            let record = create_and_save(resource, state, doc, address, config).await?;
            Ok(ActionResult::new(ActionType::Replace, address)
                .with_resource_id(record.id())
                .with_duration(started))
        }
        _ => {
            println!("{}", format!("Updating {}...", address).blue());
            utils::print_summary(&config);

            let mut record = RegexPatternSetState::new(config);
            resource.update(&mut record, &prior).await?;
            utils::save_record(state, doc, address, &record).await?;
            Ok(ActionResult::new(ActionType::Update, address)
                .with_resource_id(record.id())
                .with_duration(started))
        }
    }
}
