pub mod billing;
pub mod cart;
pub mod common;
pub mod menu;
pub mod orders;
pub mod recommend;
pub mod tables;
