// src/lib.rs
pub mod error;

pub mod data {
    pub mod ground;
    pub mod handle;
}

pub mod sim {
    pub mod reduction;
    pub mod settings;
    pub mod simulation;
}
