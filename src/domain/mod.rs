// Domain layer: core models and ports (interfaces). Nothing here talks to the network.

pub mod chat;
pub mod model;
pub mod ports;
pub mod preferences;
pub mod session;
