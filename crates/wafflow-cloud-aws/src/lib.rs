//! AWS provider for wafflow
//!
//! Binds the `aws_wafv2_regex_pattern_set` resource to the WAFv2 API.
//!
//! ## Example
//!
//! ```no_run
//! use wafflow_cloud::{DeclaredState, Resource};
//! use wafflow_cloud_aws::{
//!     ClientOptions, RegexPatternSetConfig, RegexPatternSetResource, Scope, Wafv2Client,
//! };
//!
//! # async fn example() -> wafflow_cloud::Result<()> {
//! let client = Wafv2Client::connect(&ClientOptions::default()).await;
//! let resource = RegexPatternSetResource::new(client);
//!
//! let mut state = DeclaredState::new(
//!     RegexPatternSetConfig::new("blocked-paths", Scope::Regional)
//!         .with_patterns(["^/admin", "^/wp-login"]),
//! );
//! resource.create(&mut state).await?;
//! println!("created {:?}", state.id());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod regex_pattern_set;
pub mod sdk;
pub mod tags;

pub use client::{RegexPatternSet, RegexPatternSetKey, Scope, Tag, Wafv2Api};
pub use error::{AwsError, Result};
pub use regex_pattern_set::{
    RESOURCE_TYPE, RegexPatternSetConfig, RegexPatternSetResource, Timeouts, parse_import_id,
    validate_config,
};
pub use sdk::{ClientOptions, Wafv2Client};
pub use tags::KeyValueTags;
