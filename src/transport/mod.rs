//! Message transports.
//!
//! A transport moves whole messages: `Tx` is what this side sends, `Rx` what
//! it receives. The server speaks `Transport<ServerMessage, ClientCommand>`,
//! clients the reverse.

#[async_trait::async_trait]
pub trait Transport<Tx, Rx>: Send
where
    Tx: Send + 'static,
{
    async fn send(&mut self, msg: Tx) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Rx>;
}

pub mod tcp;
