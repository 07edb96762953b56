pub mod assign;
pub mod mcp_serve;
pub mod sub_issue;
