//! Filter predicates over table columns and the catalog of filters
//! offered to clients.
pub mod error;
pub mod filter;
pub mod func;
pub mod predicate;

pub use error::{Error, Result};
pub use filter::{FilterAlias, FilterDescriptor, FilterParameter, build_filters, get_available_filters};
pub use func::{AliasHint, Capability, DbFunction, ParameterHint, builtin_functions, get_supported_functions};
pub use predicate::{
    Arity, FilterArg, LeafParams, Position, Predicate, PredicateType, check_predicate_columns,
};
