//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own identity verification and document shaping so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod documents;
pub mod identity;
