// Library exports for testing and potential library use

pub mod batch;
pub mod cli;
pub mod logging;
pub mod material_plan;
