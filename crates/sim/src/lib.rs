pub mod physics;
pub mod controller;
pub mod registry;
pub mod tour;
pub mod reward;
pub mod telemetry;
pub mod observation;
pub mod input;
pub mod policy;
pub mod episode;
pub mod runner;
pub mod analyzer;

pub use controller::*;
pub use episode::*;
pub use physics::*;
pub use policy::*;
pub use registry::GoalRegistry;
pub use runner::*;
pub use telemetry::*;
