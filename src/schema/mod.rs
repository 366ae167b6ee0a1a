pub mod broadcast_text;
pub mod chat;
pub mod entity;
pub mod text;
