pub mod broadcast;
pub mod channel;

pub use broadcast::{StateBroadcaster, StateMirror, HORN_PAYLOAD};
pub use channel::{
    ChannelMessage, LoopbackChannel, LoopbackHub, SignalChannel, Target, LABEL_CAR_UPDATE,
    LABEL_HORN,
};
