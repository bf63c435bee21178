//! Schemas: steps that narrow an unknown value to a type or shape.

mod array;
mod object;
mod primitive;
mod record;
mod tuple;
mod union;
mod wrapper;

pub use array::{array, Array};
pub use object::{object, Object};
pub use primitive::{
    any, bigint, boolean, date, literal, null, number, picklist, string, unknown, Literal,
    Picklist, TypeSchema,
};
pub use record::{record, Record};
pub use tuple::{tuple, Tuple};
pub use union::{union, Union};
pub use wrapper::{fallback, nullable, optional, Fallback, Nullable, Optional};

use sieve_core::Step;

/// What an object or tuple does with members it does not declare.
#[derive(Debug, Default)]
pub enum Extra {
    /// Drop them from the output
    #[default]
    Strip,
    /// Copy them to the output unchecked
    Keep,
    /// Report the first one as an issue
    Reject,
    /// Run each through a schema
    Rest(Box<dyn Step>),
}

impl Extra {
    pub(crate) fn is_async(&self) -> bool {
        matches!(self, Extra::Rest(step) if step.info().is_async)
    }
}
