// handlers/mod.rs - Two-tier handler layout
//
// Public (no credential) and Protected (bearer credential, identity in extensions).
pub mod protected;
pub mod public;
pub mod validation;
