pub mod login;
pub mod packet;

pub use login::Login;
pub use packet::{AprsPacket, EncodingMode, PacketEncoder, destination_comment};
