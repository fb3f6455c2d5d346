// Domain layer: core models and ports (interfaces) shared by the engines and the CLI.

pub mod model;
pub mod ports;
