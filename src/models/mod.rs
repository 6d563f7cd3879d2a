pub mod bookmark;
pub mod websocket;
