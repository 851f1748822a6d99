pub mod pool;
pub mod samples;
