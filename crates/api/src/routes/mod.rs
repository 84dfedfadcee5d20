pub mod health;
pub mod participant;
pub mod recording;
pub mod room;
pub mod webhook;
