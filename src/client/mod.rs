pub mod game;
pub mod tcp;

pub use game::{Game, RawChange};
pub use tcp::TcpClient;
