//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no UniPi and no
//! real sleeping.

mod concurrency_tests;
mod phase_tests;
mod sequencer_tests;
