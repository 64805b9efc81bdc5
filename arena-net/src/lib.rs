//! Wire codec (binary UPDATE/INPUT/SHOOT/TOGGLE_MODE + one-shot JSON CONFIG),
//! the per-client visibility broadcaster, and the websocket transport
//! adapter.

pub mod broadcaster;
pub mod codec;
pub mod transport;

pub use broadcaster::build_frame;
pub use codec::{
    decode_client_message, decode_update, encode_config_frame, encode_config_json, encode_input, encode_shoot, encode_toggle_mode,
    encode_update, ClientMessage, CodecError, UpdateEntity, UpdateFrame, UpdateHit, UpdateStats, MSG_CONFIG, MSG_INPUT, MSG_SHOOT,
    MSG_TOGGLE_MODE, MSG_UPDATE,
};
pub use transport::{serve, ConnId, ConnectionEvent};
