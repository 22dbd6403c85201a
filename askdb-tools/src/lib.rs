pub mod channel;
pub mod schema;
pub mod server;
pub mod sqlite;
pub mod tool_error;

pub use channel::{
    CallToolResult, ChannelError, LocalChannel, SessionConfig, StdioChannel, ToolChannel,
    ToolDescriptor,
};
pub use schema::{describe, render, SchemaDescriptor};
pub use server::ToolServer;
pub use tool_error::ToolError;
