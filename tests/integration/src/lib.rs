//! Integration test support crate. The tests live in `tests/`.
