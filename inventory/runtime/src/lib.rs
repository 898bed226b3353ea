#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use mesh_inventory_core as core;
pub use mesh_inventory_k8s_api as k8s;
pub use mesh_inventory_k8s_client as client;

mod args;

pub use self::args::Args;
