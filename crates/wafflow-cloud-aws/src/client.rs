//! WAFv2 API surface consumed by the resource bindings
//!
//! [`Wafv2Api`] is the seam between resource logic and transport. Production
//! code uses [`crate::sdk::Wafv2Client`] while tests use the in-memory fake.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use wafflow_cloud::CloudError;

/// Deployment scope of a WAFv2 entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Regional resources (ALB, API Gateway, AppSync, Cognito)
    #[serde(rename = "REGIONAL")]
    Regional,
    /// CloudFront distributions, served from us-east-1
    #[serde(rename = "CLOUDFRONT")]
    Cloudfront,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Regional => "REGIONAL",
            Scope::Cloudfront => "CLOUDFRONT",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = CloudError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "REGIONAL" => Ok(Scope::Regional),
            "CLOUDFRONT" => Ok(Scope::Cloudfront),
            other => Err(CloudError::validation(
                "scope",
                format!("expected one of CLOUDFRONT, REGIONAL, got {:?}", other),
            )),
        }
    }
}

/// Address of one regex pattern set: `id`, `name` and `scope` together
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegexPatternSetKey {
    pub id: String,
    pub name: String,
    pub scope: Scope,
}

impl fmt::Display for RegexPatternSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.id, self.name, self.scope)
    }
}

/// Key/value tag attached to a WAFv2 entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Regex pattern set as reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexPatternSet {
    pub id: String,
    pub name: String,
    pub arn: String,
    pub description: Option<String>,
    pub regular_expression_list: Vec<String>,
}

/// Identifier returned by a successful create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexPatternSetSummary {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRegexPatternSetOutput {
    pub regex_pattern_set: RegexPatternSet,
    /// Token the next update or delete must carry
    pub lock_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRegexPatternSetInput {
    pub name: String,
    pub scope: Scope,
    pub description: Option<String>,
    pub regular_expression_list: Vec<String>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRegexPatternSetInput {
    pub key: RegexPatternSetKey,
    pub description: Option<String>,
    pub regular_expression_list: Vec<String>,
    pub lock_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRegexPatternSetInput {
    pub key: RegexPatternSetKey,
    pub lock_token: String,
}

/// Remote operations on regex pattern sets and their tags
#[async_trait]
pub trait Wafv2Api: Send + Sync {
    async fn create_regex_pattern_set(
        &self,
        input: CreateRegexPatternSetInput,
    ) -> Result<RegexPatternSetSummary>;

    async fn get_regex_pattern_set(
        &self,
        key: &RegexPatternSetKey,
    ) -> Result<GetRegexPatternSetOutput>;

    /// Rejected with `WAFOptimisticLockException` when `input.lock_token` is stale
    async fn update_regex_pattern_set(&self, input: UpdateRegexPatternSetInput) -> Result<()>;

    async fn delete_regex_pattern_set(&self, input: DeleteRegexPatternSetInput) -> Result<()>;

    async fn list_tags_for_resource(&self, scope: Scope, arn: &str) -> Result<Vec<Tag>>;

    async fn tag_resource(&self, scope: Scope, arn: &str, tags: Vec<Tag>) -> Result<()>;

    async fn untag_resource(&self, scope: Scope, arn: &str, keys: Vec<String>) -> Result<()>;
}
