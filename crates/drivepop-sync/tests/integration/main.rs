//! Integration tests for drivepop-sync
//!
//! Runs the engine, reconciler and deletion policy against an in-memory
//! Drive that records every call, with real local trees in temp dirs.


mod test_reconcile;
