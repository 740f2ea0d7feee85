mod order_steps;
mod setups;
mod world;

pub use world::JardimWorld;
