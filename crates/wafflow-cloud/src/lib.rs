//! wafflow Cloud Resource Lifecycle
//!
//! This crate provides the contract between the wafflow CLI and the
//! provider bindings that manage individual remote resources.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   wafflow CLI                    │
//! │      (create / read / update / delete / import)  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 wafflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │            Resource Contract              │   │
//! │  │  trait Resource { ... }                   │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Bounded Retry│  │  State Docs  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │   AWS WAFv2   │
//!           │   bindings    │
//!           └───────────────┘
//! ```

pub mod action;
pub mod error;
pub mod resource;
pub mod retry;
pub mod state;

// Re-exports
pub use action::{ActionResult, ActionType};
pub use error::{ApiError, CloudError, Result};
pub use resource::{DeclaredState, Resource};
pub use retry::{DEFAULT_TIMEOUT, RetryConfig, RetryError, retry};
pub use state::{StateDocument, StateManager};
