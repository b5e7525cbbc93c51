#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("chainId has incorrect syntax {0:#?}")]
    MalformedChainId(String),

    #[error("Invalid wallet event {0:#?}")]
    InvalidEvent(String),

    #[error("Unknown contract interface {0:#?}")]
    InvalidContractKind(String),

    #[error("Invalid ether amount {0:#?}")]
    InvalidAmount(String),
}
