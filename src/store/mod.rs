pub mod memory;
pub mod seed;

pub use memory::{Fault, Injection, MemoryCondoStore};
pub use seed::{DEMO_MONTHLY_QUOTA_CENTS, DEMO_UNITS, DemoBuilding};
