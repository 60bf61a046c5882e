//! # antnet-types::metrics
//!
//! Constants for metric names and labels. Centralizing these prevents
//! typos and keeps the engine's emission sites consistent with external
//! dashboards scraping the `metrics` facade.

// --- Metric Names ---
pub const MET_PKT_SENT: &str = "antnet_pkt_sent_total";
pub const MET_PKT_DELIVERED: &str = "antnet_pkt_delivered_total";
pub const MET_PKT_DROPPED: &str = "antnet_pkt_dropped_total";
pub const MET_CS_HIT: &str = "antnet_cs_hit_total";
pub const MET_FIB_REINFORCED: &str = "antnet_fib_reinforced_total";
pub const MET_PIT_SERVED: &str = "antnet_pit_served_total";
pub const MET_CONTENT_RETRIEVED: &str = "antnet_content_retrieved_total";

// --- Label Keys ---
pub const LBL_NODE: &str = "node";
pub const LBL_LINK: &str = "link";
pub const LBL_REASON: &str = "reason";
pub const LBL_MODE: &str = "mode";
