pub mod generate;
pub mod health;
pub mod results;
pub mod session;
