//! Constraint evaluation for Kubernetes resource schemas
//!
//! Resource shapes come from the generated `k8s_openapi` types. This crate adds the
//! light constraints that schema declarations attach to their fields, such as
//! "a list of more than one port has unique, non-null names", and evaluates them
//! eagerly when a record is built.
//!
//! ```rust
//! use k8s_openapi::api::core::v1::{EndpointPort, EndpointSubset};
//! use kube_constraints::Validate;
//!
//! let subset = EndpointSubset {
//!     ports: Some(vec![
//!         EndpointPort { name: Some("a".into()), port: 80, ..Default::default() },
//!         EndpointPort { name: Some("a".into()), port: 81, ..Default::default() },
//!     ]),
//!     ..Default::default()
//! };
//! let violations = subset.validate().unwrap_err();
//! assert_eq!(violations.rules().collect::<Vec<_>>(), ["has_unique_port_names"]);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod catalog;
pub use catalog::Catalog;

pub mod dynamic;
pub use dynamic::{DynamicObject, TypeMeta};

mod error;
pub use error::{ConstraintViolation, Error, Violations};

pub mod evaluator;
pub use evaluator::Evaluator;

pub mod gvk;
pub use gvk::{GroupVersion, GroupVersionKind};

pub mod params;
pub use params::ValidationParams;

mod path;
pub use path::FieldPath;

pub mod ports;
pub use ports::{has_non_null_port_names, has_unique_port_names, PortEntry, Protocol};

mod resources;

pub mod rule;
pub use rule::{Reason, Rule};

pub mod status;
pub use status::ErrorResponse;

mod validate;
pub use validate::{Validate, Validated};

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
