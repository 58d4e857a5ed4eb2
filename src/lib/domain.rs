//! Domain logic: request validation, admission control and send orchestration

pub mod admission;
pub mod communication;
pub mod health;
pub mod state;
