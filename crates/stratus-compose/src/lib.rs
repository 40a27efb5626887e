//! # stratus-compose
//!
//! Resource-graph composition engine: a small set of high-level capability
//! options expands deterministically into a consistent, internally
//! cross-referenced graph of declarative resource definitions.
//!
//! Handles:
//! - **Queue**: durable queue with a dead-letter policy and optional
//!   pub/sub fan-in (topic, subscription, delivery policy).
//! - **Function**: base compute-function scaffolding (function, log group,
//!   generated execution role).
//! - **Trigger**: a function wired to consume from a queue, with the
//!   consumer permissions merged into the generated role.
//! - **Policy**: typed IAM statement and document fragments.
//!
//! Every composition is a pure, synchronous transformation: options in,
//! resource graph out. Nothing is provisioned and no intrinsic reference
//! is resolved.

pub mod function;
pub mod policy;
pub mod queue;
pub mod trigger;
