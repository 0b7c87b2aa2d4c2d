//! One extractor per page shape. Both share the leaves in `crate::parser`
//! and never fail as a whole: a field that cannot be read is left `None`.

pub mod automata;
pub mod current;
