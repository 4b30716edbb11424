//! Pipeline passes, in the order the translator runs them.
//!
//! Each pass consumes a tree and returns a new one. Passes that call backend
//! hooks take the backend explicitly and route every hook call through the
//! diagnostic wrapper.

pub mod division;
pub mod generate;
pub mod infer;
pub mod render;
pub mod tagging;
pub mod transform;

pub use division::{DIVISION_FUNCTION, DIVISION_OPERATOR, rewrite_division};
pub use generate::generation_loop;
pub use infer::{declared_variables, infer_types, type_of};
pub use render::render;
pub use tagging::{tag, tag_first_appearance};
pub use transform::{transform_round, transform_step};
