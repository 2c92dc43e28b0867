#![warn(clippy::all)]

//! Algorithms for fitting planar slabs to point clouds.
//!
//! The entry points are [segmentation::estimate_slab] for finding the single best-supported slab
//! and [segmentation::extract_slabs] for greedily extracting multiple slabs.

// Spatial index over point cloud subsets, used to accelerate slab range queries.
pub mod kd_tree;
// RANSAC slab estimation and greedy multi-slab extraction.
pub mod segmentation;
