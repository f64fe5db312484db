pub mod event;
pub mod inscription;
pub mod payment;
