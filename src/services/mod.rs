//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod ad;
pub mod email;
pub mod password;
pub mod password_reset;
pub mod session;
pub mod user;

#[cfg(all(test, feature = "live-db-tests"))]
pub(crate) mod test_support;
