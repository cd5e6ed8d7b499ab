pub mod fish;
pub mod health;
