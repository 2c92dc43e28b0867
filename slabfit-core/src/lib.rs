#![warn(clippy::all)]

//! Core data structures for planar slab segmentation of point clouds
//!
//! This crate provides the point cloud container and the geometric primitives
//! (bounding boxes, planes, slabs) that the segmentation algorithms in
//! `slabfit-algorithms` operate on.

pub extern crate nalgebra;

/// Point cloud storage
pub mod containers;
/// Geometric primitives: bounding boxes, planes and slabs
pub mod math;
