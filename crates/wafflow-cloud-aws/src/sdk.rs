//! WAFv2 client backed by the AWS SDK
//!
//! CLOUDFRONT-scoped entities live in us-east-1 regardless of the configured
//! region, so the client keeps one SDK client per endpoint family.

use crate::client::{
    CreateRegexPatternSetInput, DeleteRegexPatternSetInput, GetRegexPatternSetOutput,
    RegexPatternSet, RegexPatternSetKey, RegexPatternSetSummary, Scope, Tag,
    UpdateRegexPatternSetInput, Wafv2Api,
};
use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_wafv2::Client;
use aws_sdk_wafv2::config::Region;
use aws_sdk_wafv2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_wafv2::types::{Regex, Scope as SdkScope, Tag as SdkTag};
use wafflow_cloud::ApiError;

/// Region serving CLOUDFRONT-scoped WAFv2 entities
pub const CLOUDFRONT_REGION: &str = "us-east-1";

/// Connection settings for [`Wafv2Client`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Region for REGIONAL entities; the default provider chain decides when unset
    pub region: Option<String>,

    /// Named profile from the shared AWS config files
    pub profile: Option<String>,

    /// Endpoint override, e.g. a local emulator
    pub endpoint_url: Option<String>,
}

/// WAFv2 API client
#[derive(Clone, Debug)]
pub struct Wafv2Client {
    regional: Client,
    cloudfront: Client,
}

impl Wafv2Client {
    /// Load credentials and region from the environment and connect
    pub async fn connect(options: &ClientOptions) -> Self {
        let regional = build_client(options, options.region.clone()).await;
        let cloudfront = build_client(options, Some(CLOUDFRONT_REGION.to_string())).await;

        tracing::debug!(
            region = ?options.region,
            profile = ?options.profile,
            "Initialized WAFv2 clients"
        );

        Self {
            regional,
            cloudfront,
        }
    }

    fn client_for(&self, scope: Scope) -> &Client {
        match scope {
            Scope::Regional => &self.regional,
            Scope::Cloudfront => &self.cloudfront,
        }
    }
}

async fn build_client(options: &ClientOptions, region: Option<String>) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }
    if let Some(profile) = &options.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint) = &options.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}

impl From<Scope> for SdkScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Regional => SdkScope::Regional,
            Scope::Cloudfront => SdkScope::Cloudfront,
        }
    }
}

/// Reduce an SDK error to its service error code and message
fn api_error<E, R>(err: SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    AwsError::Api(ApiError::new(code, message))
}

fn regex_list(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::builder().regex_string(p).build())
        .collect()
}

fn sdk_tags(tags: Vec<Tag>) -> Result<Vec<SdkTag>> {
    tags.into_iter()
        .map(|t| {
            SdkTag::builder()
                .key(t.key)
                .value(t.value)
                .build()
                .map_err(AwsError::from)
        })
        .collect()
}

#[async_trait]
impl Wafv2Api for Wafv2Client {
    async fn create_regex_pattern_set(
        &self,
        input: CreateRegexPatternSetInput,
    ) -> Result<RegexPatternSetSummary> {
        let tags = if input.tags.is_empty() {
            None
        } else {
            Some(sdk_tags(input.tags)?)
        };

        let output = self
            .client_for(input.scope)
            .create_regex_pattern_set()
            .name(&input.name)
            .scope(input.scope.into())
            .set_description(input.description)
            .set_regular_expression_list(Some(regex_list(&input.regular_expression_list)))
            .set_tags(tags)
            .send()
            .await
            .map_err(api_error)?;

        let summary = output.summary().ok_or(AwsError::MissingField("Summary"))?;
        Ok(RegexPatternSetSummary {
            id: summary
                .id()
                .ok_or(AwsError::MissingField("Summary.Id"))?
                .to_string(),
        })
    }

    async fn get_regex_pattern_set(
        &self,
        key: &RegexPatternSetKey,
    ) -> Result<GetRegexPatternSetOutput> {
        let output = self
            .client_for(key.scope)
            .get_regex_pattern_set()
            .id(&key.id)
            .name(&key.name)
            .scope(key.scope.into())
            .send()
            .await
            .map_err(api_error)?;

        let set = output
            .regex_pattern_set()
            .ok_or(AwsError::MissingField("RegexPatternSet"))?;
        let lock_token = output
            .lock_token()
            .ok_or(AwsError::MissingField("LockToken"))?
            .to_string();

        Ok(GetRegexPatternSetOutput {
            regex_pattern_set: RegexPatternSet {
                id: set.id().unwrap_or(key.id.as_str()).to_string(),
                name: set.name().unwrap_or(key.name.as_str()).to_string(),
                arn: set
                    .arn()
                    .ok_or(AwsError::MissingField("RegexPatternSet.ARN"))?
                    .to_string(),
                description: set.description().map(str::to_string),
                regular_expression_list: set
                    .regular_expression_list()
                    .iter()
                    .filter_map(|r| r.regex_string())
                    .map(str::to_string)
                    .collect(),
            },
            lock_token,
        })
    }

    async fn update_regex_pattern_set(&self, input: UpdateRegexPatternSetInput) -> Result<()> {
        self.client_for(input.key.scope)
            .update_regex_pattern_set()
            .id(&input.key.id)
            .name(&input.key.name)
            .scope(input.key.scope.into())
            .set_description(input.description)
            .set_regular_expression_list(Some(regex_list(&input.regular_expression_list)))
            .lock_token(input.lock_token)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_regex_pattern_set(&self, input: DeleteRegexPatternSetInput) -> Result<()> {
        self.client_for(input.key.scope)
            .delete_regex_pattern_set()
            .id(&input.key.id)
            .name(&input.key.name)
            .scope(input.key.scope.into())
            .lock_token(input.lock_token)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_tags_for_resource(&self, scope: Scope, arn: &str) -> Result<Vec<Tag>> {
        let client = self.client_for(scope);
        let mut tags = Vec::new();
        let mut next_marker: Option<String> = None;

        loop {
            let output = client
                .list_tags_for_resource()
                .resource_arn(arn)
                .set_next_marker(next_marker.take())
                .send()
                .await
                .map_err(api_error)?;

            if let Some(info) = output.tag_info_for_resource() {
                tags.extend(
                    info.tag_list()
                        .iter()
                        .map(|t| Tag::new(t.key(), t.value())),
                );
            }

            match output.next_marker() {
                Some(marker) if !marker.is_empty() => next_marker = Some(marker.to_string()),
                _ => break,
            }
        }

        Ok(tags)
    }

    async fn tag_resource(&self, scope: Scope, arn: &str, tags: Vec<Tag>) -> Result<()> {
        self.client_for(scope)
            .tag_resource()
            .resource_arn(arn)
            .set_tags(Some(sdk_tags(tags)?))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn untag_resource(&self, scope: Scope, arn: &str, keys: Vec<String>) -> Result<()> {
        self.client_for(scope)
            .untag_resource()
            .resource_arn(arn)
            .set_tag_keys(Some(keys))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
