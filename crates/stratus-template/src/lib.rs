//! # stratus-template
//!
//! Data model for declarative infrastructure templates.
//!
//! Handles:
//! - **Value**: property trees and the intrinsic references (`Ref`,
//!   `Fn::GetAtt`, `Fn::Sub`) substituted at provisioning time.
//! - **Resource**: typed resource definitions and the insertion-ordered
//!   [`ResourceGraph`] they live in.
//! - **Template**: complete documents, fragment merging, and parameter and
//!   output declarations.
//! - **Order**: deployment-order resolution over explicit and intrinsic
//!   dependencies.

pub mod order;
pub mod resource;
pub mod template;
pub mod value;

pub use resource::{DependsOn, Resource, ResourceGraph};
pub use template::{Export, Output, Parameter, Template};
pub use value::Value;
