// Domain layer: input records, the linear model, reports and ports (interfaces).

pub mod lp;
pub mod model;
pub mod ports;
pub mod report;
