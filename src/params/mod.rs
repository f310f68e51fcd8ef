pub mod coercer;
pub mod decoder;
pub mod document;
pub mod errors;
pub mod flat;
pub mod heuristic;

pub use coercer::coerce;
pub use decoder::decode;
pub use document::Document;
pub use errors::{ParamsError, ParamsResult};
pub use flat::FlatParams;
pub use heuristic::{coerce_heuristic, coerce_named_integers};
