pub mod error;
pub mod integrator;
pub mod messages;
pub mod params;
pub mod plot;
pub mod session;
pub mod solver;
pub mod window;
pub mod worker;
