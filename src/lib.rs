pub mod backend;
pub mod config;
pub mod geo;
pub mod orbit;
pub mod pulse;
pub mod radar;
pub mod swath;
pub mod tracker;
pub mod web;
