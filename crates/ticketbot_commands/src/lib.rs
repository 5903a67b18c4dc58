pub mod checks;
pub mod commands;
