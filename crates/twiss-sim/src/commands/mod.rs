pub mod optics;
pub mod species;
pub mod synth;
pub mod version;
