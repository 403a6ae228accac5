mod codec;
mod common;
mod diagnostics;
#[cfg(feature = "gltf")]
mod gltf_import;
mod playback;
mod runtime;
mod skinning;
mod state_machine;
