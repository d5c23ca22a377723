pub mod layout_spec;
pub mod render_binder;

pub use layout_spec::{AmplitudeSlot, Anchor, LayoutSpec, MetricSlot};
pub use render_binder::RenderBinder;
