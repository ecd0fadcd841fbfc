//! Background [`Task`]s definitions.

mod background;
pub mod sweep_auth_cache;

pub use common::Handler as Task;

pub use self::{
    background::{Background, TaskError},
    sweep_auth_cache::SweepAuthCache,
};
