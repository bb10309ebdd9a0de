//! Embedded answer list
//!
//! Generated from `data/answers.txt` by the build script.

include!(concat!(env!("OUT_DIR"), "/answers.rs"));
