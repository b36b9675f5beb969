//! OS-level inputs of directory resolution.
//!
//! [`Env`](env::Env) is the environment snapshot consulted by every resolver and
//! [`Platform`](platform::Platform) describes the path conventions of the target system.

pub mod env;
pub mod platform;
