//! Concrete task library for pawn behaviors.

pub mod eat;
pub mod find_food;
pub mod find_mate;
pub mod find_wander;
pub mod flee_from;
pub mod mate;
pub mod move_to;
pub mod wait;

pub use eat::Eat;
pub use find_food::{find_food, FindFood};
pub use find_mate::FindMate;
pub use find_wander::FindWanderSpot;
pub use flee_from::FleeFrom;
pub use mate::Mate;
pub use move_to::MoveTo;
pub use wait::Wait;
