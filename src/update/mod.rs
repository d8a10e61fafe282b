//! Update checking for the plugin panel
//!
//! This module compares the running plugin version with a remote manifest
//! and keeps an "update available" notification in sync with the result.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Manifest   │────▶│   Checker   │────▶│  Notifier   │
//! │  (fetch)    │     │ (state mach)│     │ (show/hide) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │       │
//!                        ▼       ▼
//!                ┌─────────┐   ┌─────────────┐
//!                │ Version │   │  Scheduler  │
//!                │ (cmp)   │   │  (timers)   │
//!                └─────────┘   └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`checker`]: `UpdateChecker` state machine (initial check, polling, shutdown)
//! - [`error`]: Error types for fetching, checking and configuration
//! - [`host`]: Access to the version of the running host plugin
//! - [`manifest`]: Remote manifest type and HTTP source
//! - [`notifier`]: Notification collaborator trait
//! - [`scheduler`]: Delayed and recurring timers
//! - [`version`]: Version parsing and comparison

pub mod checker;
pub mod error;
pub mod host;
pub mod manifest;
pub mod notifier;
pub mod scheduler;
pub mod version;
