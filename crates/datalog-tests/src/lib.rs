//! End-to-end scenarios and property-based tests
//!
//! Exercises the whole pipeline (safety, stratification, magic sets,
//! evaluation) through the `datalog` facade.

#[cfg(test)]
mod support;

#[cfg(test)]
mod scenarios;

#[cfg(test)]
mod proptest_programs;
