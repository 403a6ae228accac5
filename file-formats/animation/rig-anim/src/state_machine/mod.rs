//! Animation state machines: definition, binary codec and runtime instance

pub mod codec;
pub mod definition;
pub mod instance;

pub use codec::{decode_state_machine, encode_state_machine, encode_state_machine_with_header};
pub use definition::{ClipInfo, StateInfo, StateMachine, Transition};
pub use instance::StateMachineInstance;
