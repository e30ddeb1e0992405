//! WAFv2 regex pattern set resource
//!
//! Maps declared `aws_wafv2_regex_pattern_set` state onto WAFv2 API calls.
//! Mutations run under the shared bounded retry policy; update and delete
//! fetch a fresh lock token at the start of every attempt.

use crate::client::{
    CreateRegexPatternSetInput, DeleteRegexPatternSetInput, RegexPatternSet, RegexPatternSetKey,
    Scope, UpdateRegexPatternSetInput, Wafv2Api,
};
use crate::error::{AwsError, codes};
use crate::tags::KeyValueTags;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use wafflow_cloud::{
    CloudError, DEFAULT_TIMEOUT, DeclaredState, Resource, Result, RetryConfig, RetryError, retry,
};

pub const RESOURCE_TYPE: &str = "aws_wafv2_regex_pattern_set";

const NAME_MAX_LEN: usize = 128;
const DESCRIPTION_MAX_LEN: usize = 256;

/// Error codes worth another attempt within the retry budget
const RETRYABLE_CODES: &[&str] = &[
    codes::WAF_INTERNAL_ERROR,
    codes::WAF_TAG_OPERATION,
    codes::WAF_TAG_OPERATION_INTERNAL_ERROR,
    codes::WAF_OPTIMISTIC_LOCK,
];

/// Declared attributes of a regex pattern set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexPatternSetConfig {
    pub name: String,

    pub scope: Scope,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub regular_expression_list: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    /// Computed by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

impl RegexPatternSetConfig {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
            description: None,
            regular_expression_list: BTreeSet::new(),
            tags: BTreeMap::new(),
            arn: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regular_expression_list = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Per-operation retry budgets
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
        }
    }
}

/// CRUD adapter for WAFv2 regex pattern sets
pub struct RegexPatternSetResource<C> {
    client: C,
    retry: RetryConfig,
    timeouts: Timeouts,
}

impl<C: Wafv2Api> RegexPatternSetResource<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Look the entity up, mapping "does not exist" to `None`
    pub async fn exists(&self, key: &RegexPatternSetKey) -> Result<Option<RegexPatternSet>> {
        match self.client.get_regex_pattern_set(key).await {
            Ok(output) => Ok(Some(output.regex_pattern_set)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into_cloud(format!(
                "error reading WAFv2 regex pattern set ({})",
                key.id
            ))),
        }
    }

    /// Succeeds when the entity is gone
    pub async fn verify_destroyed(&self, key: &RegexPatternSetKey) -> Result<()> {
        match self.exists(key).await? {
            None => Ok(()),
            Some(set) => Err(CloudError::ResourceStillExists(format!(
                "WAFv2 regex pattern set {} ({})",
                set.name, set.id
            ))),
        }
    }

    async fn update_tags(
        &self,
        scope: Scope,
        arn: &str,
        old: &BTreeMap<String, String>,
        new: &BTreeMap<String, String>,
    ) -> Result<()> {
        let changes = KeyValueTags::from(old).diff(&KeyValueTags::from(new));

        if !changes.remove.is_empty() {
            tracing::debug!(arn, keys = ?changes.remove, "Removing tags");
            self.client
                .untag_resource(scope, arn, changes.remove)
                .await
                .map_err(|e| e.into_cloud("error updating tags"))?;
        }

        if !changes.upsert.is_empty() {
            tracing::debug!(arn, count = changes.upsert.len(), "Updating tags");
            self.client
                .tag_resource(scope, arn, changes.upsert)
                .await
                .map_err(|e| e.into_cloud("error updating tags"))?;
        }

        Ok(())
    }
}

/// Remote address of the resource held in `state`
fn key_of(state: &DeclaredState<RegexPatternSetConfig>) -> Result<RegexPatternSetKey> {
    let id = state.id().ok_or_else(|| {
        CloudError::InvalidConfig(format!(
            "{} {:?} has no id; create or import it first",
            RESOURCE_TYPE, state.config.name
        ))
    })?;

    Ok(RegexPatternSetKey {
        id: id.to_string(),
        name: state.config.name.clone(),
        scope: state.config.scope,
    })
}

pub fn is_retryable(err: &AwsError) -> bool {
    RETRYABLE_CODES.iter().any(|code| err.is_code(code))
}

fn classify(err: AwsError, context: &str) -> RetryError<CloudError> {
    if is_retryable(&err) {
        RetryError::Retryable(err.into_cloud(context))
    } else {
        RetryError::NonRetryable(err.into_cloud(context))
    }
}

fn lock_token_prefix(token: &str) -> String {
    token.chars().take(8).collect()
}

/// Parse an import identifier of the form `ID/NAME/SCOPE`
pub fn parse_import_id(import_id: &str) -> Result<RegexPatternSetKey> {
    let parts: Vec<&str> = import_id.split('/').collect();
    match parts.as_slice() {
        [id, name, scope] if !id.is_empty() && !name.is_empty() && !scope.is_empty() => {
            Ok(RegexPatternSetKey {
                id: id.to_string(),
                name: name.to_string(),
                scope: scope
                    .parse()
                    .map_err(|_| CloudError::InvalidImportId(import_id.to_string()))?,
            })
        }
        _ => Err(CloudError::InvalidImportId(import_id.to_string())),
    }
}

/// Check declared attributes against the schema
pub fn validate_config(config: &RegexPatternSetConfig) -> Result<()> {
    let name_len = config.name.chars().count();
    if !(1..=NAME_MAX_LEN).contains(&name_len) {
        return Err(CloudError::validation(
            "name",
            format!("length must be between 1 and {}, got {}", NAME_MAX_LEN, name_len),
        ));
    }

    if let Some(description) = &config.description {
        let len = description.chars().count();
        if !(1..=DESCRIPTION_MAX_LEN).contains(&len) {
            return Err(CloudError::validation(
                "description",
                format!(
                    "length must be between 1 and {}, got {}",
                    DESCRIPTION_MAX_LEN, len
                ),
            ));
        }
    }

    if config.regular_expression_list.is_empty() {
        return Err(CloudError::validation(
            "regular_expression_list",
            "at least one regular expression is required",
        ));
    }
    if config.regular_expression_list.iter().any(|r| r.is_empty()) {
        return Err(CloudError::validation(
            "regular_expression_list",
            "regular expressions must not be empty",
        ));
    }

    if config.tags.keys().any(|k| k.is_empty()) {
        return Err(CloudError::validation("tags", "tag keys must not be empty"));
    }

    Ok(())
}

#[async_trait]
impl<C: Wafv2Api> Resource for RegexPatternSetResource<C> {
    type Config = RegexPatternSetConfig;

    fn validate(&self, config: &RegexPatternSetConfig) -> Result<()> {
        validate_config(config)
    }

    fn replacement_reason(
        &self,
        prior: &RegexPatternSetConfig,
        desired: &RegexPatternSetConfig,
    ) -> Option<&'static str> {
        if prior.name != desired.name {
            Some("name")
        } else if prior.scope != desired.scope {
            Some("scope")
        } else {
            None
        }
    }

    async fn create(&self, state: &mut DeclaredState<RegexPatternSetConfig>) -> Result<()> {
        validate_config(&state.config)?;

        let config = &state.config;
        tracing::info!(
            name = %config.name,
            scope = %config.scope,
            "Creating WAFv2 regex pattern set"
        );

        let input = CreateRegexPatternSetInput {
            name: config.name.clone(),
            scope: config.scope,
            description: config.description.clone(),
            regular_expression_list: config.regular_expression_list.iter().cloned().collect(),
            tags: KeyValueTags::from(&config.tags).ignore_aws().to_tags(),
        };

        let client = &self.client;
        let input = &input;
        let summary = retry(
            &self.retry.with_timeout(self.timeouts.create),
            move || async move {
                client
                    .create_regex_pattern_set(input.clone())
                    .await
                    .map_err(|e| classify(e, "failed creating WAFv2 regex pattern set"))
            },
        )
        .await?;

        tracing::debug!(id = %summary.id, "Created WAFv2 regex pattern set");
        state.set_id(summary.id);

        self.read(state).await
    }

    async fn read(&self, state: &mut DeclaredState<RegexPatternSetConfig>) -> Result<()> {
        let key = key_of(state)?;
        tracing::info!(id = %key.id, name = %key.name, "Reading WAFv2 regex pattern set");

        let output = match self.client.get_regex_pattern_set(&key).await {
            Ok(output) => output,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    id = %key.id,
                    "WAFv2 regex pattern set not found, removing from state"
                );
                state.clear_id();
                return Ok(());
            }
            Err(e) => {
                return Err(e.into_cloud(format!(
                    "error reading WAFv2 regex pattern set ({})",
                    key.id
                )));
            }
        };

        let set = output.regex_pattern_set;
        let tags = self
            .client
            .list_tags_for_resource(key.scope, &set.arn)
            .await
            .map_err(|e| {
                e.into_cloud(format!(
                    "error listing tags for WAFv2 regex pattern set ({})",
                    set.arn
                ))
            })?;

        let config = &mut state.config;
        config.name = set.name;
        config.description = set.description;
        config.regular_expression_list = set.regular_expression_list.into_iter().collect();
        config.tags = KeyValueTags::from(tags).ignore_aws().into_map();
        config.arn = Some(set.arn);

        Ok(())
    }

    async fn update(
        &self,
        state: &mut DeclaredState<RegexPatternSetConfig>,
        prior: &DeclaredState<RegexPatternSetConfig>,
    ) -> Result<()> {
        validate_config(&state.config)?;

        if let Some(attribute) = self.replacement_reason(&prior.config, &state.config) {
            return Err(CloudError::RequiresReplacement {
                attribute: attribute.to_string(),
            });
        }

        if state.is_absent() {
            if let Some(id) = prior.id() {
                state.set_id(id);
            }
        }

        let key = key_of(state)?;
        tracing::info!(id = %key.id, name = %key.name, "Updating WAFv2 regex pattern set");

        let template = UpdateRegexPatternSetInput {
            key: key.clone(),
            description: state.config.description.clone(),
            regular_expression_list: state.config.regular_expression_list.iter().cloned().collect(),
            lock_token: String::new(),
        };

        let client = &self.client;
        let template = &template;
        let arn = retry(
            &self.retry.with_timeout(self.timeouts.update),
            move || async move {
                let current = client
                    .get_regex_pattern_set(&template.key)
                    .await
                    .map_err(|e| RetryError::NonRetryable(e.into_cloud("error getting lock token")))?;
                tracing::debug!(
                    lock_token = %lock_token_prefix(&current.lock_token),
                    "Fetched lock token"
                );

                let input = UpdateRegexPatternSetInput {
                    lock_token: current.lock_token,
                    ..template.clone()
                };
                client
                    .update_regex_pattern_set(input)
                    .await
                    .map_err(|e| classify(e, "error updating WAFv2 regex pattern set"))?;

                Ok::<_, RetryError<CloudError>>(current.regex_pattern_set.arn)
            },
        )
        .await?;

        if state.config.tags != prior.config.tags {
            self.update_tags(key.scope, &arn, &prior.config.tags, &state.config.tags)
                .await?;
        }

        self.read(state).await
    }

    async fn delete(&self, state: &DeclaredState<RegexPatternSetConfig>) -> Result<()> {
        let key = key_of(state)?;
        tracing::info!(id = %key.id, name = %key.name, "Deleting WAFv2 regex pattern set");

        let client = &self.client;
        let key = &key;
        retry(
            &self.retry.with_timeout(self.timeouts.delete),
            move || async move {
                let current = client
                    .get_regex_pattern_set(key)
                    .await
                    .map_err(|e| RetryError::NonRetryable(e.into_cloud("error getting lock token")))?;
                tracing::debug!(
                    lock_token = %lock_token_prefix(&current.lock_token),
                    "Fetched lock token"
                );

                client
                    .delete_regex_pattern_set(DeleteRegexPatternSetInput {
                        key: key.clone(),
                        lock_token: current.lock_token,
                    })
                    .await
                    .map_err(|e| classify(e, "error deleting WAFv2 regex pattern set"))?;

                Ok::<_, RetryError<CloudError>>(())
            },
        )
        .await
    }

    async fn import(&self, import_id: &str) -> Result<Vec<DeclaredState<RegexPatternSetConfig>>> {
        let key = parse_import_id(import_id)?;
        tracing::info!(id = %key.id, name = %key.name, scope = %key.scope, "Importing WAFv2 regex pattern set");

        Ok(vec![DeclaredState::with_id(
            key.id,
            RegexPatternSetConfig::new(key.name, key.scope),
        )])
    }
}
