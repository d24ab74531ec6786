//! # fedconf-value
//!
//! Tri-state dynamic configuration values and the descriptors that shape them.
//!
//! A [`DynamicValue`] is either `Null`, `Unknown` (planning time only) or
//! `Known`, and always carries the [`TypeDescriptor`] it was built against.
//! Descriptors come from declared [`Shape`]s via [`describe`].
//!
//! ```rust
//! use fedconf_value::{DynamicValue, TypeDescriptor};
//!
//! let link = TypeDescriptor::object([
//!     ("id", TypeDescriptor::string()),
//!     ("location", TypeDescriptor::string()),
//! ]);
//! let value = DynamicValue::object(
//!     link.clone(),
//!     [
//!         ("id", DynamicValue::string("ldapDs")),
//!         ("location", DynamicValue::null(TypeDescriptor::string())),
//!     ],
//! )
//! .unwrap();
//! assert!(value.is_defined());
//! assert!(value.attribute("location").unwrap().is_null());
//! ```

mod descriptor;
mod error;
mod path;
mod value;

pub use descriptor::{describe, DescriptorKind, ScalarKind, Shape, TypeDescriptor};
pub use error::BridgeError;
pub use path::{AttrPath, PathStep};
pub use value::{DynamicValue, Payload, Scalar, ValueState};
