pub mod modular;
pub mod prime;
