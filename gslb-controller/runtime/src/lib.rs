pub use gslb_controller_core as core;
pub use gslb_controller_k8s_api as k8s;
pub use gslb_controller_k8s_index as index;
pub use gslb_controller_queue as queue;

mod args;
mod sink;
mod worker;

pub use self::{
    args::Args,
    sink::{GraphSink, LogSink},
};
