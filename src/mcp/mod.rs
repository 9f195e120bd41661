mod server;

pub use server::run_mcp_server;
