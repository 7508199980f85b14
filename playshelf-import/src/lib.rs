//! Reconcile provider game records into the local catalog.
//!
//! This crate owns the import path: resolving studios, tags and platforms,
//! the fill-blank-only merge policy, the transactional reconciliation
//! engine, export serialization and best-effort webhook notification.

pub mod export;
pub mod merge;
pub mod notify;
pub mod progress;
pub mod reconcile;
pub mod resolver;

pub use export::{ExportError, serialize};
pub use merge::{
    CollectionMerge, IncomingFields, StatusPatch, apply_status, fill_blank_int, fill_blank_score,
    fill_blank_text, merge_collection, plan_field_patch, promote_status,
};
pub use notify::{API_KEY_HEADER, DELIVERY_TIMEOUT, NotifyOutcome, WebhookNotifier};
pub use progress::{LogProgress, ReconcileProgress, SilentProgress};
pub use reconcile::{
    ReconcileError, ReconcileOutcome, ReconcileStats, ReconciliationEngine, SkipReason,
    reconcile_many,
};
pub use resolver::{EntityResolver, ResolveError, ResolvedEntities, ResolvedPlatform};
