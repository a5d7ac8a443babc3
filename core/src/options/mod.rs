// bindery/src/options/mod.rs

//! Typed workflow options and the tabular option value model.

pub mod model;
pub mod option;
pub mod validation;
pub mod value;

pub use model::{title_case, OptionValueModel};
pub use option::JobOption;
pub use value::{OptionKind, OptionValue, UserArgs};
