use anyhow::Context as _;
use colored::Colorize;
use std::path::Path;
use wafflow_cloud::{DeclaredState, StateDocument, StateManager};
use wafflow_cloud_aws::RegexPatternSetConfig;

pub type RegexPatternSetState = DeclaredState<RegexPatternSetConfig>;

/// Read a regex pattern set definition from YAML
pub fn load_definition(path: &Path) -> anyhow::Result<RegexPatternSetConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: RegexPatternSetConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if config.arn.is_some() {
        anyhow::bail!("{}: arn is computed and cannot be set", path.display());
    }
    Ok(config)
}

/// Load the state document and the record at `address`
pub async fn load_record(
    state: &StateManager,
    address: &str,
) -> anyhow::Result<(StateDocument, Option<RegexPatternSetState>)> {
    let doc = state
        .load()
        .await
        .with_context(|| format!("failed to load {}", state.state_path().display()))?;
    let record = doc
        .get_resource(address)
        .with_context(|| format!("state record {} is malformed", address))?;
    Ok((doc, record))
}

/// Load the record at `address`, failing when there is none
pub async fn require_record(
    state: &StateManager,
    address: &str,
) -> anyhow::Result<(StateDocument, RegexPatternSetState)> {
    match load_record(state, address).await? {
        (doc, Some(record)) => Ok((doc, record)),
        (_, None) => anyhow::bail!(
            "{} is not in the state document {}",
            address,
            state.state_path().display()
        ),
    }
}

pub async fn save_record(
    state: &StateManager,
    mut doc: StateDocument,
    address: &str,
    record: &RegexPatternSetState,
) -> anyhow::Result<()> {
    doc.set_resource(address, record)?;
    state
        .save(&doc)
        .await
        .with_context(|| format!("failed to write {}", state.state_path().display()))
}

pub async fn remove_record(
    state: &StateManager,
    mut doc: StateDocument,
    address: &str,
) -> anyhow::Result<()> {
    doc.remove_resource(address);
    state
        .save(&doc)
        .await
        .with_context(|| format!("failed to write {}", state.state_path().display()))
}

/// Print the declared attributes of a regex pattern set
pub fn print_summary(config: &RegexPatternSetConfig) {
    println!("  name:  {}", config.name.cyan());
    println!("  scope: {}", config.scope);
    if let Some(description) = &config.description {
        println!("  description: {}", description);
    }
    println!("  patterns ({}):", config.regular_expression_list.len());
    for pattern in &config.regular_expression_list {
        println!("    • {}", pattern);
    }
    if !config.tags.is_empty() {
        println!("  tags:");
        for (k, v) in &config.tags {
            println!("    {} = {}", k, v);
        }
    }
}
