pub mod ask;
pub mod holidays;
pub mod onboard;
pub mod tools;
