pub mod mldsa65;
pub mod mlkem768;
pub mod xchacha20poly1305;

pub use mldsa65::MlDsa65Suite;
pub use mlkem768::MlKem768Suite;
pub use xchacha20poly1305::XChaChaAead;
