//! Lifecycle tests for the regex pattern set resource against the in-memory fake

use std::time::Duration;
use wafflow_cloud::{CloudError, DeclaredState, Resource};
use wafflow_cloud_aws::error::codes;
use wafflow_cloud_aws::mock::{InMemoryWafv2, Operation};
use wafflow_cloud_aws::{
    RegexPatternSetConfig, RegexPatternSetKey, RegexPatternSetResource, Scope, Timeouts,
};

fn resource(fake: &InMemoryWafv2) -> RegexPatternSetResource<InMemoryWafv2> {
    RegexPatternSetResource::new(fake.clone())
}

fn declared(name: &str) -> DeclaredState<RegexPatternSetConfig> {
    DeclaredState::new(
        RegexPatternSetConfig::new(name, Scope::Regional)
            .with_description(name)
            .with_patterns(["one", "two"])
            .with_tag("Tag1", "Value1")
            .with_tag("Tag2", "Value2"),
    )
}

fn key_of(state: &DeclaredState<RegexPatternSetConfig>) -> RegexPatternSetKey {
    RegexPatternSetKey {
        id: state.id().unwrap().to_string(),
        name: state.config.name.clone(),
        scope: state.config.scope,
    }
}

async fn created(
    resource: &RegexPatternSetResource<InMemoryWafv2>,
    name: &str,
) -> DeclaredState<RegexPatternSetConfig> {
    let mut state = declared(name);
    resource.create(&mut state).await.unwrap();
    state
}

#[tokio::test(start_paused = true)]
async fn create_then_read_reflects_remote() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);

    let state = created(&resource, "my-set").await;

    let id = state.id().unwrap();
    let remote = fake.get(id).unwrap();
    assert_eq!(remote.name, "my-set");

    let config = &state.config;
    assert_eq!(config.description.as_deref(), Some("my-set"));
    assert_eq!(
        config.regular_expression_list.iter().collect::<Vec<_>>(),
        vec!["one", "two"]
    );
    assert_eq!(config.tags.len(), 2);
    assert_eq!(config.arn.as_deref(), Some(remote.arn.as_str()));
    assert!(remote.arn.contains(":regional/regexpatternset/my-set/"));
}

#[tokio::test(start_paused = true)]
async fn create_cloudfront_scope() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);

    let mut state = DeclaredState::new(
        RegexPatternSetConfig::new("edge", Scope::Cloudfront).with_patterns(["^/admin"]),
    );
    resource.create(&mut state).await.unwrap();

    assert_eq!(state.config.scope, Scope::Cloudfront);
    assert!(state.config.arn.unwrap().contains(":global/regexpatternset/edge/"));
}

#[tokio::test(start_paused = true)]
async fn create_retries_transient_errors() {
    let fake = InMemoryWafv2::new();
    fake.fail_times(Operation::Create, codes::WAF_INTERNAL_ERROR, 3);
    let resource = resource(&fake);

    let state = created(&resource, "retried").await;

    assert!(!state.is_absent());
    assert_eq!(fake.count(Operation::Create), 4);
    assert_eq!(fake.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn create_rejects_invalid_config_before_calling_remote() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);

    let mut state = DeclaredState::new(RegexPatternSetConfig::new("empty", Scope::Regional));
    let err = resource.create(&mut state).await.unwrap_err();

    assert!(matches!(err, CloudError::Validation { .. }));
    assert!(fake.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn create_non_retryable_error_fails_once() {
    let fake = InMemoryWafv2::new();
    fake.fail_next(Operation::Create, codes::WAF_INVALID_PARAMETER, "bad regex");
    let resource = resource(&fake);

    let mut state = declared("bad");
    let err = resource.create(&mut state).await.unwrap_err();

    assert!(err.to_string().contains("failed creating WAFv2 regex pattern set"));
    assert_eq!(
        err.api_error().map(|e| e.code.as_str()),
        Some(codes::WAF_INVALID_PARAMETER)
    );
    assert_eq!(fake.count(Operation::Create), 1);
    assert!(state.is_absent());
}

#[tokio::test(start_paused = true)]
async fn read_of_missing_resource_clears_id() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let mut state = created(&resource, "vanishing").await;

    fake.remove_externally(state.id().unwrap());
    resource.read(&mut state).await.unwrap();

    assert!(state.is_absent());
}

#[tokio::test(start_paused = true)]
async fn read_fails_when_tags_cannot_be_listed() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let mut state = created(&resource, "tagless").await;

    fake.fail_next(Operation::ListTags, codes::WAF_TAG_OPERATION, "tags unavailable");
    let err = resource.read(&mut state).await.unwrap_err();

    assert!(err.to_string().contains("error listing tags"));
    assert!(!state.is_absent());
}

#[tokio::test(start_paused = true)]
async fn read_hides_reserved_tags() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let mut state = created(&resource, "reserved").await;

    let arn = state.config.arn.clone().unwrap();
    fake.put_tags(&arn, &[("aws:cloudformation:stack-name", "stack")]);
    resource.read(&mut state).await.unwrap();

    assert!(!state.config.tags.keys().any(|k| k.starts_with("aws:")));
    assert_eq!(state.config.tags.len(), 2);
    assert_eq!(fake.tags(&arn).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn update_changes_patterns_description_and_tags() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let prior = created(&resource, "evolving").await;

    let mut state = prior.clone();
    state.config.description = Some("updated".to_string());
    state.config.regular_expression_list = ["one", "two", "three"]
        .into_iter()
        .map(String::from)
        .collect();
    state.config.tags.remove("Tag1");
    state
        .config
        .tags
        .insert("Tag2".to_string(), "Changed".to_string());
    state
        .config
        .tags
        .insert("Tag3".to_string(), "Value3".to_string());

    resource.update(&mut state, &prior).await.unwrap();

    let remote = fake.get(prior.id().unwrap()).unwrap();
    assert_eq!(remote.description.as_deref(), Some("updated"));
    assert_eq!(remote.regular_expression_list.len(), 3);

    let tags = fake.tags(&remote.arn);
    assert!(!tags.contains_key("Tag1"));
    assert_eq!(tags.get("Tag2").map(String::as_str), Some("Changed"));
    assert_eq!(tags.get("Tag3").map(String::as_str), Some("Value3"));
    assert_eq!(state.config.tags, tags);
    assert_eq!(fake.count(Operation::Untag), 1);
    assert_eq!(fake.count(Operation::Tag), 1);
}

#[tokio::test(start_paused = true)]
async fn update_without_tag_changes_skips_tag_calls() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let prior = created(&resource, "quiet").await;

    let mut state = prior.clone();
    state.config.description = Some("new description".to_string());
    resource.update(&mut state, &prior).await.unwrap();

    assert_eq!(fake.count(Operation::Tag), 0);
    assert_eq!(fake.count(Operation::Untag), 0);
}

#[tokio::test(start_paused = true)]
async fn update_tag_failure_ends_operation_without_retry() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let prior = created(&resource, "tagged").await;

    fake.fail_next(Operation::Tag, codes::WAF_TAG_OPERATION, "tagging unavailable");
    let gets_before = fake.count(Operation::Get);
    let list_tags_before = fake.count(Operation::ListTags);

    let mut state = prior.clone();
    state.config.description = Some("patterns first".to_string());
    state
        .config
        .tags
        .insert("Tag3".to_string(), "Value3".to_string());
    let err = resource.update(&mut state, &prior).await.unwrap_err();

    assert!(err.to_string().contains("error updating tags"));
    assert_eq!(fake.count(Operation::Tag), 1);
    // only the lock token fetch, no refresh after the failure
    assert_eq!(fake.count(Operation::Get) - gets_before, 1);
    assert_eq!(fake.count(Operation::ListTags), list_tags_before);
    assert_eq!(
        fake.get(prior.id().unwrap()).unwrap().description.as_deref(),
        Some("patterns first")
    );
}

#[tokio::test(start_paused = true)]
async fn update_uses_token_fetched_after_external_change() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let prior = created(&resource, "contended").await;
    let id = prior.id().unwrap().to_string();

    let token_at_create = fake.current_lock_token(&id).unwrap();
    fake.modify_externally(&id, &["external"]);
    let token_after_change = fake.current_lock_token(&id).unwrap();
    assert_ne!(token_at_create, token_after_change);

    let mut state = prior.clone();
    state.config.regular_expression_list = ["mine".to_string()].into_iter().collect();
    resource.update(&mut state, &prior).await.unwrap();

    assert_eq!(fake.lock_tokens_used(Operation::Update), vec![token_after_change]);
    assert_eq!(
        fake.get(&id).unwrap().regular_expression_list,
        vec!["mine".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn update_retries_optimistic_lock_with_fresh_token() {
    let fake = InMemoryWafv2::new();
    fake.fail_next(Operation::Update, codes::WAF_OPTIMISTIC_LOCK, "stale");
    let resource = resource(&fake);
    let prior = created(&resource, "locked").await;

    let gets_before = fake.count(Operation::Get);
    let mut state = prior.clone();
    state.config.description = Some("second try".to_string());
    resource.update(&mut state, &prior).await.unwrap();

    assert_eq!(fake.count(Operation::Update), 2);
    // one token fetch per attempt plus the final read
    assert_eq!(fake.count(Operation::Get) - gets_before, 3);
    assert_eq!(state.config.description.as_deref(), Some("second try"));
}

#[tokio::test(start_paused = true)]
async fn update_lock_token_failure_is_not_retried() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let prior = created(&resource, "unreadable").await;

    fake.fail_next(Operation::Get, codes::WAF_INTERNAL_ERROR, "boom");
    let mut state = prior.clone();
    state.config.description = Some("never applied".to_string());
    let err = resource.update(&mut state, &prior).await.unwrap_err();

    assert!(err.to_string().starts_with("error getting lock token"));
    assert_eq!(fake.count(Operation::Update), 0);
}

#[tokio::test(start_paused = true)]
async fn update_gives_up_after_timeout_with_final_attempt() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake).with_timeouts(Timeouts {
        update: Duration::from_secs(5),
        ..Timeouts::default()
    });
    let prior = created(&resource, "stuck").await;

    fake.fail_times(Operation::Update, codes::WAF_INTERNAL_ERROR, 100);
    let mut state = prior.clone();
    state.config.description = Some("stuck".to_string());

    let started = tokio::time::Instant::now();
    let err = resource.update(&mut state, &prior).await.unwrap_err();

    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(
        err.api_error().map(|e| e.code.as_str()),
        Some(codes::WAF_INTERNAL_ERROR)
    );
    assert!(fake.count(Operation::Update) >= 2);
}

#[tokio::test(start_paused = true)]
async fn update_of_name_or_scope_requires_replacement() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let prior = created(&resource, "original").await;

    let mut renamed = prior.clone();
    renamed.config.name = "renamed".to_string();
    let err = resource.update(&mut renamed, &prior).await.unwrap_err();
    assert!(matches!(err, CloudError::RequiresReplacement { ref attribute } if attribute == "name"));

    let mut moved = prior.clone();
    moved.config.scope = Scope::Cloudfront;
    let err = resource.update(&mut moved, &prior).await.unwrap_err();
    assert!(matches!(err, CloudError::RequiresReplacement { ref attribute } if attribute == "scope"));

    assert_eq!(fake.count(Operation::Update), 0);
}

#[tokio::test(start_paused = true)]
async fn delete_after_update_uses_current_token() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let prior = created(&resource, "short-lived").await;
    let id = prior.id().unwrap().to_string();

    let mut state = prior.clone();
    state.config.description = Some("bump".to_string());
    resource.update(&mut state, &prior).await.unwrap();
    let token_after_update = fake.current_lock_token(&id).unwrap();

    resource.delete(&state).await.unwrap();

    assert_eq!(fake.lock_tokens_used(Operation::Delete), vec![token_after_update]);
    assert!(fake.is_empty());
}

#[tokio::test(start_paused = true)]
async fn delete_then_verify_destroyed() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let state = created(&resource, "doomed").await;
    let key = key_of(&state);

    let err = resource.verify_destroyed(&key).await.unwrap_err();
    assert!(matches!(err, CloudError::ResourceStillExists(_)));

    resource.delete(&state).await.unwrap();

    resource.verify_destroyed(&key).await.unwrap();
    assert!(resource.exists(&key).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn delete_of_missing_resource_fails() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let state = created(&resource, "already-gone").await;

    fake.remove_externally(state.id().unwrap());
    let err = resource.delete(&state).await.unwrap_err();

    assert!(err.to_string().starts_with("error getting lock token"));
}

#[tokio::test(start_paused = true)]
async fn delete_retries_optimistic_lock() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let state = created(&resource, "racy").await;

    fake.fail_next(Operation::Delete, codes::WAF_OPTIMISTIC_LOCK, "stale");
    resource.delete(&state).await.unwrap();

    assert_eq!(fake.count(Operation::Delete), 2);
    assert!(fake.is_empty());
}

#[tokio::test(start_paused = true)]
async fn import_then_read_populates_state() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);
    let original = created(&resource, "imported").await;
    let import_id = key_of(&original).to_string();

    let mut states = resource.import(&import_id).await.unwrap();
    assert_eq!(states.len(), 1);

    let mut state = states.remove(0);
    assert_eq!(state.id(), original.id());
    assert!(state.config.regular_expression_list.is_empty());

    resource.read(&mut state).await.unwrap();
    assert_eq!(state, original);
}

#[tokio::test(start_paused = true)]
async fn import_rejects_malformed_id() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);

    let err = resource.import("only-an-id").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "unexpected format of ID (\"only-an-id\"), expected ID/NAME/SCOPE"
    );
    assert!(fake.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn patterns_and_tags_read_back_exactly() {
    let fake = InMemoryWafv2::new();
    let resource = resource(&fake);

    let mut state = DeclaredState::new(
        RegexPatternSetConfig::new("exact", Scope::Regional)
            .with_patterns(["^foobar$", "^example$"])
            .with_tag("Tag1", "Value1")
            .with_tag("Tag2", "Value2"),
    );
    resource.create(&mut state).await.unwrap();

    let mut fresh = DeclaredState::with_id(
        state.id().unwrap(),
        RegexPatternSetConfig::new("exact", Scope::Regional),
    );
    resource.read(&mut fresh).await.unwrap();

    assert_eq!(fresh.config.regular_expression_list.len(), 2);
    assert!(fresh.config.regular_expression_list.contains("^foobar$"));
    assert!(fresh.config.regular_expression_list.contains("^example$"));
    assert_eq!(fresh.config.tags.len(), 2);
    assert_eq!(fresh.config.tags.get("Tag2").map(String::as_str), Some("Value2"));
    assert_eq!(fresh.config.description, None);
}
