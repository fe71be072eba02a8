//! Push channel: socket.io client, frame codec and pairing images.

pub mod frame;
mod qr_image;
mod socket_io;

pub use qr_image::{QrImage, QrImageError};
pub use socket_io::{PushChannel, PushError, PushHandle, jittered_delay, websocket_url};
