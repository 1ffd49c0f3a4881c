//! Domain model: participants, ledger records, money and the split policy seam.

pub mod ledger;
pub mod money;
pub mod participant;
pub mod ports;
pub mod settlement;
pub mod split;
