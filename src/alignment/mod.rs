pub mod boundary;
pub mod locator;
pub mod markers;
pub mod normalization;
pub(crate) mod offsets;
pub mod report;
pub mod sequencer;
pub mod similarity;
