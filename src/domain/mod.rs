// Domain layer: parameter model and the ports the launcher drives.

pub mod model;
pub mod ports;
