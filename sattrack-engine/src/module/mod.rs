pub mod fetch;
pub mod frames;
pub mod propagation;
pub mod session;
