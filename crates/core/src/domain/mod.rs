pub mod earnings;
pub mod portfolio;
