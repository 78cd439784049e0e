pub mod common;
pub mod bedrock;

pub use common::ModelInvoker;
pub use bedrock::BedrockInvoker;
