mod executor;
mod runner;
mod script;
mod types;

pub use executor::*;
pub use runner::*;
pub use types::*;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod query_tests;
