pub mod depth_estimator;
pub mod depth_map;
pub mod temporal_smoother;
