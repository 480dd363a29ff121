pub mod arena;
pub mod recency_list;

pub use arena::{Arena, NodeId};
pub use recency_list::RecencyList;
