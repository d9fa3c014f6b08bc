// handlers/protected/mod.rs - Protected handlers (bearer credential required)
//
// Every handler takes the request `Identity` and calls `require()` before
// touching the data layer.
pub mod collections;
pub mod images;
pub mod user;
