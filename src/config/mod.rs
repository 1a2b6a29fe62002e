pub mod merged;
pub mod region;
pub mod settings;
