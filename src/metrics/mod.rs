// Alignment, classification and tree-building stages
pub mod align;
pub mod classify;
pub mod aggregate;
pub mod tree;
pub mod layout;

// Re-export commonly used items
pub use align::{align_series, align_all, no_data_series};
pub use classify::{classify_internal, classify_external, classify_internal_series, classify_external_series};
pub use aggregate::{rollup_status, aggregate_service, aggregate_external};
pub use tree::{build_cluster_tree, ClusterInputs, ClusterTree, ServiceOverview, PodNode};
pub use layout::{compute_layout, Jitter, SeededJitter, NoJitter, Layout, LayoutKey, Point};
