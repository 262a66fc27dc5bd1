// Copyright @yucwang 2021

pub mod medium;
pub mod phase;
pub mod photon;
pub mod rng;
pub mod settings;
pub mod settings_loader;
pub mod tally;
pub mod transport;
