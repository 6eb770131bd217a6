// Domain layer: cupping and sales models plus the ports the pipelines are written against.

pub mod model;
pub mod ports;
pub mod sales;
