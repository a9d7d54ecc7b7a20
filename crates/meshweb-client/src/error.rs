#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("substrate error: {0}")]
    Substrate(#[from] meshweb_proto::MeshError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config/state decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("field codec error: {0}")]
    FieldCodec(#[from] meshweb_proto::FieldCodecError),
}
