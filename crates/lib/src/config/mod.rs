//! Configuration layers and their merge algebra.
//!
//! A variant is configured by stacking layers: the default config at the bottom,
//! then each product flavor. [`ConfigLayer::merge_over`] is overlay-wins per field,
//! so folding flavors left to right means the last flavor that sets a field wins.
//! Build types are a separate layer kind ([`BuildType`]) carrying debug switches.

mod types;

pub use types::*;

/// Fold flavors over `default` in order, returning the merged layer.
///
/// `merged = fN.merge_over(... f2.merge_over(f1.merge_over(default)))`
pub fn merge_layers<'a, I>(default: &ConfigLayer, flavors: I) -> ConfigLayer
where
  I: IntoIterator<Item = &'a ConfigLayer>,
{
  flavors
    .into_iter()
    .fold(default.clone(), |merged, flavor| flavor.merge_over(&merged))
}
