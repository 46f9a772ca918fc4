pub mod calendar;
pub mod dates;
pub mod decision;
pub mod fishing_window;
pub mod ledger;
pub mod occupancy;
pub mod rules;
