pub mod k8s;
pub mod publisher;
pub mod registry;
