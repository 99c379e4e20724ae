pub mod sampler;
pub mod simulator;

pub use sampler::KeySampler;
pub use simulator::step;
