//! In-memory WAFv2 fake
//!
//! Behaves like the service for the calls [`Wafv2Api`] exposes: lock tokens
//! rotate on every mutation, stale tokens are rejected with
//! `WAFOptimisticLockException`, and missing entities report
//! `WAFNonexistentItemException`. Failures can be queued per operation.

use crate::client::{
    CreateRegexPatternSetInput, DeleteRegexPatternSetInput, GetRegexPatternSetOutput,
    RegexPatternSet, RegexPatternSetKey, RegexPatternSetSummary, Scope, Tag,
    UpdateRegexPatternSetInput, Wafv2Api,
};
use crate::error::{AwsError, Result, codes};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use wafflow_cloud::ApiError;

const ACCOUNT_ID: &str = "123456789012";
const REGION: &str = "us-east-1";

/// Call kinds the fake records and can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Get,
    Update,
    Delete,
    ListTags,
    Tag,
    Untag,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    /// Lock token carried by update and delete calls
    pub lock_token: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    set: RegexPatternSet,
    scope: Scope,
    lock_token: String,
}

#[derive(Debug, Default)]
struct Inner {
    sets: BTreeMap<String, Entry>,
    tags: HashMap<String, BTreeMap<String, String>>,
    failures: HashMap<Operation, VecDeque<ApiError>>,
    calls: Vec<Call>,
    next_id: u64,
    next_token: u64,
}

impl Inner {
    fn record(&mut self, operation: Operation, lock_token: Option<&str>) -> Result<()> {
        self.calls.push(Call {
            operation,
            lock_token: lock_token.map(str::to_string),
        });

        match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(AwsError::Api(err)),
            None => Ok(()),
        }
    }

    fn rotate_token(&mut self) -> String {
        self.next_token += 1;
        format!("token-{:04}", self.next_token)
    }

    fn entry(&self, key: &RegexPatternSetKey) -> Result<&Entry> {
        self.sets
            .get(&key.id)
            .filter(|e| e.set.name == key.name && e.scope == key.scope)
            .ok_or_else(|| not_found(&key.id))
    }

    fn entry_mut(&mut self, key: &RegexPatternSetKey) -> Result<&mut Entry> {
        self.sets
            .get_mut(&key.id)
            .filter(|e| e.set.name == key.name && e.scope == key.scope)
            .ok_or_else(|| not_found(&key.id))
    }

    fn check_arn(&self, arn: &str) -> Result<()> {
        if self.sets.values().any(|e| e.set.arn == arn) {
            Ok(())
        } else {
            Err(not_found(arn))
        }
    }
}

fn not_found(what: &str) -> AwsError {
    AwsError::Api(ApiError::new(
        codes::WAF_NONEXISTENT_ITEM,
        format!("AWS WAF couldn't perform the operation because your resource ({}) doesn't exist.", what),
    ))
}

fn stale_token() -> AwsError {
    AwsError::Api(ApiError::new(
        codes::WAF_OPTIMISTIC_LOCK,
        "AWS WAF couldn't save your changes because someone changed the resource after you started to edit it.",
    ))
}

fn arn_for(scope: Scope, name: &str, id: &str) -> String {
    let family = match scope {
        Scope::Regional => "regional",
        Scope::Cloudfront => "global",
    };
    format!(
        "arn:aws:wafv2:{}:{}:{}/regexpatternset/{}/{}",
        REGION, ACCOUNT_ID, family, name, id
    )
}

/// Shared-state WAFv2 fake; clones observe the same entities
#[derive(Debug, Clone, Default)]
pub struct InMemoryWafv2 {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryWafv2 {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread must not hide state from the others
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue an error returned by the next call of `operation`
    pub fn fail_next(&self, operation: Operation, code: &str, message: &str) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(ApiError::new(code, message));
    }

    /// Queue the same error for the next `times` calls of `operation`
    pub fn fail_times(&self, operation: Operation, code: &str, times: usize) {
        for _ in 0..times {
            self.fail_next(operation, code, "injected failure");
        }
    }

    /// Change an entity outside of the resource, rotating its lock token
    pub fn modify_externally(&self, id: &str, patterns: &[&str]) {
        let mut inner = self.lock();
        let token = inner.rotate_token();
        if let Some(entry) = inner.sets.get_mut(id) {
            entry.set.regular_expression_list = patterns.iter().map(|p| p.to_string()).collect();
            entry.lock_token = token;
        }
    }

    /// Delete an entity outside of the resource
    pub fn remove_externally(&self, id: &str) {
        let mut inner = self.lock();
        if let Some(entry) = inner.sets.remove(id) {
            inner.tags.remove(&entry.set.arn);
        }
    }

    /// Attach tags directly, e.g. reserved `aws:` keys
    pub fn put_tags(&self, arn: &str, tags: &[(&str, &str)]) {
        let mut inner = self.lock();
        let entry = inner.tags.entry(arn.to_string()).or_default();
        for (k, v) in tags {
            entry.insert(k.to_string(), v.to_string());
        }
    }

    pub fn get(&self, id: &str) -> Option<RegexPatternSet> {
        self.lock().sets.get(id).map(|e| e.set.clone())
    }

    pub fn tags(&self, arn: &str) -> BTreeMap<String, String> {
        self.lock().tags.get(arn).cloned().unwrap_or_default()
    }

    pub fn current_lock_token(&self, id: &str) -> Option<String> {
        self.lock().sets.get(id).map(|e| e.lock_token.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().sets.is_empty()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Lock tokens sent with calls of `operation`, in order
    pub fn lock_tokens_used(&self, operation: Operation) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .filter_map(|c| c.lock_token.clone())
            .collect()
    }
}

#[async_trait]
impl Wafv2Api for InMemoryWafv2 {
    async fn create_regex_pattern_set(
        &self,
        input: CreateRegexPatternSetInput,
    ) -> Result<RegexPatternSetSummary> {
        let mut inner = self.lock();
        inner.record(Operation::Create, None)?;

        let duplicate = inner
            .sets
            .values()
            .any(|e| e.set.name == input.name && e.scope == input.scope);
        if duplicate {
            return Err(AwsError::Api(ApiError::new(
                codes::WAF_DUPLICATE_ITEM,
                format!("a regex pattern set named {} already exists", input.name),
            )));
        }

        inner.next_id += 1;
        let id = format!("rps-{:04}", inner.next_id);
        let arn = arn_for(input.scope, &input.name, &id);
        let lock_token = inner.rotate_token();

        let mut patterns = Vec::new();
        for pattern in input.regular_expression_list {
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }

        let set = RegexPatternSet {
            id: id.clone(),
            name: input.name.clone(),
            arn: arn.clone(),
            description: input.description,
            regular_expression_list: patterns,
        };
        inner.sets.insert(
            id.clone(),
            Entry {
                set,
                scope: input.scope,
                lock_token,
            },
        );
        inner.tags.insert(
            arn,
            input.tags.into_iter().map(|t| (t.key, t.value)).collect(),
        );

        Ok(RegexPatternSetSummary { id })
    }

    async fn get_regex_pattern_set(
        &self,
        key: &RegexPatternSetKey,
    ) -> Result<GetRegexPatternSetOutput> {
        let mut inner = self.lock();
        inner.record(Operation::Get, None)?;

        let entry = inner.entry(key)?;
        Ok(GetRegexPatternSetOutput {
            regex_pattern_set: entry.set.clone(),
            lock_token: entry.lock_token.clone(),
        })
    }

    async fn update_regex_pattern_set(
        &self,
        input: UpdateRegexPatternSetInput,
    ) -> Result<()> {
        let mut inner = self.lock();
        inner.record(Operation::Update, Some(&input.lock_token))?;

        if inner.entry(&input.key)?.lock_token != input.lock_token {
            return Err(stale_token());
        }

        let next = inner.rotate_token();
        let entry = inner.entry_mut(&input.key)?;
        entry.set.description = input.description;
        entry.set.regular_expression_list = input.regular_expression_list;
        entry.lock_token = next;

        Ok(())
    }

    async fn delete_regex_pattern_set(&self, input: DeleteRegexPatternSetInput) -> Result<()> {
        let mut inner = self.lock();
        inner.record(Operation::Delete, Some(&input.lock_token))?;

        let arn = {
            let entry = inner.entry(&input.key)?;
            if entry.lock_token != input.lock_token {
                return Err(stale_token());
            }
            entry.set.arn.clone()
        };

        inner.sets.remove(&input.key.id);
        inner.tags.remove(&arn);
        Ok(())
    }

    async fn list_tags_for_resource(&self, _scope: Scope, arn: &str) -> Result<Vec<Tag>> {
        let mut inner = self.lock();
        inner.record(Operation::ListTags, None)?;
        inner.check_arn(arn)?;

        Ok(inner
            .tags
            .get(arn)
            .map(|tags| tags.iter().map(|(k, v)| Tag::new(k, v)).collect())
            .unwrap_or_default())
    }

    async fn tag_resource(&self, _scope: Scope, arn: &str, tags: Vec<Tag>) -> Result<()> {
        let mut inner = self.lock();
        inner.record(Operation::Tag, None)?;
        inner.check_arn(arn)?;

        let entry = inner.tags.entry(arn.to_string()).or_default();
        for tag in tags {
            entry.insert(tag.key, tag.value);
        }
        Ok(())
    }

    async fn untag_resource(&self, _scope: Scope, arn: &str, keys: Vec<String>) -> Result<()> {
        let mut inner = self.lock();
        inner.record(Operation::Untag, None)?;
        inner.check_arn(arn)?;

        if let Some(entry) = inner.tags.get_mut(arn) {
            for key in keys {
                entry.remove(&key);
            }
        }
        Ok(())
    }
}
