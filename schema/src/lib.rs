//! Schema model shared by the protoenv compiler and its tests.
//!
//! A [`ProtoFile`] is what the compiler's parser produces from a `.proto`
//! file. [`ScalarKind`] and [`WrapperKind`] close the set of field types a
//! loader knows how to populate, and [`Value`] is the dynamic representation
//! the IR interpreter populates.
//!
//! ```
//! use protoenv_schema::*;
//!
//! assert_eq!(ScalarKind::from_proto_name("int32"), Some(ScalarKind::Int32));
//! assert_eq!(zero_value(ScalarKind::Int32), Value::Int32(0));
//! assert_eq!(
//!     WrapperKind::from_type_name("google.protobuf.BoolValue").map(WrapperKind::scalar),
//!     Some(ScalarKind::Bool)
//! );
//! ```

pub mod kinds;
pub mod schema;
pub mod value;

pub use kinds::*;
pub use schema::*;
pub use value::*;
