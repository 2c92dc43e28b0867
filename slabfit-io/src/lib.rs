#![warn(clippy::all)]

//! Support for reading and writing point cloud files for slabfit.
//!
//! The only supported format is the plain-text `xyz` format: one point per line, either
//! `x y z` or `x y z nx ny nz`, whitespace separated

pub mod xyz;
