pub mod contract;
pub mod handler;
pub mod resolve;
pub mod skeleton;
pub mod stub;
pub mod transport;
