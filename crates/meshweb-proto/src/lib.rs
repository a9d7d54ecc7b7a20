//! Narrow mesh-substrate contract and wire field tags shared by
//! `meshweb-server` and `meshweb-client`.
//!
//! Stability class: stable. This crate is the seam meshweb's two roles
//! program against instead of talking to LXMF/Reticulum directly.

pub mod adapter;
pub mod announce;
pub mod constants;
pub mod error;
pub mod fields;
pub mod hash;
pub mod loopback;
pub mod persist;

pub use adapter::{AnnounceEvent, Delivery, LocalEndpoint, MeshAdapter};
pub use announce::{classify_marker, decode_display_name, strip_marker, MarkerClass};
pub use error::MeshError;
pub use fields::{decode_fields, FieldCodecError, FileAttachment, InboundPayload};
pub use hash::{DestinationHash, ParseHashError};
pub use loopback::{LoopbackMeshAdapter, LoopbackNetwork};
