pub mod aead;
pub mod kem;
pub mod sig;

pub use aead::*;
pub use kem::*;
pub use sig::*;
