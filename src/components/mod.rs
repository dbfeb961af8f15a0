//! UI components.

pub mod friend_graph;
