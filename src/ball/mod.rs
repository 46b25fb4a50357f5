//! Ball module - flight contract and the reference court integrator

mod court_ball;
mod flight;

pub use court_ball::CourtBall;
pub use flight::BallFlight;
