//! Bundled sample network, shown when the page embeds no data of its own.

use super::types::FriendData;

const SAMPLE_JSON: &str = include_str!("../../../data/sample.json");

/// Eight friends and ten events from 2023.
pub fn sample_data() -> Result<FriendData, serde_json::Error> {
	serde_json::from_str(SAMPLE_JSON)
}
