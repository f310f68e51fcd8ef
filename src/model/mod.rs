pub mod errors;
pub mod registry;
pub mod service;
pub mod shape;

pub use errors::{ModelError, ModelResult};
pub use registry::{to_pascal_case, to_snake_case, OperationRegistry};
pub use service::{OperationDef, Protocol, ServiceModel};
pub use shape::{Location, MemberRef, ParamShape, ShapeKind, ShapeResolver};
