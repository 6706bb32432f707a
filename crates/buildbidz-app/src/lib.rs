// BuildBidz orchestrator: user commands in, UI updates out.

pub mod app;
pub mod forms;
pub mod protocol;
pub mod session;
