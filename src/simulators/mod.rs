// Copyright @yucwang 2021

pub mod parallel;
pub mod simulator;
