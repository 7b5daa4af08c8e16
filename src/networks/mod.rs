pub mod layer;
pub mod qnetwork;

pub use layer::{Activation, Layer};
pub use qnetwork::{Parameter, QNetwork};
