pub mod anvil;
pub mod nbt;
pub mod world;
