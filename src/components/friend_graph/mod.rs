//! Friend network visualization.
//!
//! Friends are nodes, and two friends are linked when they attended at least
//! one event together; the link grows stronger with every shared event.
//! - [`FriendStore`] holds the friends and events
//! - [`GraphStore`] derives nodes and edges under the active filter and tracks selection
//! - [`ForceSimulation`] lays the graph out, keeping unconnected friends close
//! - [`FriendGraphCanvas`] draws it with drag, click, pan and zoom
//!
//! # Example
//!
//! ```ignore
//! use friend_graph::{FriendGraphCanvas, FriendStore, GraphStore};
//!
//! let friends = FriendStore::new(data);
//! let graph = GraphStore::from_store(&friends);
//!
//! view! { <FriendGraphCanvas store=graph fullscreen=true /> }
//! ```

mod component;
pub mod derive;
pub mod filter;
pub mod forces;
mod render;
pub mod sample;
pub mod scale;
pub mod selection;
pub mod simulation;
mod state;
pub mod store;
pub mod theme;
pub mod types;

pub use component::FriendGraphCanvas;
pub use derive::RadiusScale;
pub use filter::{FilterState, UNCATEGORIZED};
pub use sample::sample_data;
pub use simulation::{ForceConfig, ForceSimulation, SimNode};
pub use store::{FriendStore, GraphStore};
pub use theme::Theme;
pub use types::{ConnectedFriend, EdgeKey, Event, EventTypeOption, Friend, FriendData, GraphEdge, GraphNode};
