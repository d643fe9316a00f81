//! `RuleStore`, per spec.md §4.1: derives per-layer `AntennaModel` factors
//! from the tech database's `AntennaRule` once, at design load, so the hot
//! path never has to fall back on conditionals.

use std::collections::HashMap;

use crate::model::design::Design;
use crate::model::layer::LayerId;

#[derive(Debug, Clone, Copy, Default)]
pub struct AntennaModel {
    pub metal_factor: f64,
    pub diff_metal_factor: f64,
    pub cut_factor: f64,
    pub diff_cut_factor: f64,
    pub side_metal_factor: f64,
    pub diff_side_metal_factor: f64,
    pub minus_diff_factor: f64,
    pub plus_diff_factor: f64,
}

#[derive(Debug, Default)]
pub struct RuleStore {
    models: HashMap<LayerId, AntennaModel>,
}

impl RuleStore {
    /// Builds the store for every layer that carries an `AntennaRule`,
    /// warning once per layer with a side-area rule but zero thickness.
    pub fn build(design: &Design) -> Self {
        let mut models = HashMap::new();
        for layer in design.layers() {
            let Some(rule) = &layer.rule else { continue };

            let area_factor = rule.area_factor;
            let (metal_factor, diff_metal_factor) =
                if rule.area_factor_diff_only { (1.0, area_factor) } else { (area_factor, area_factor) };
            let cut_area_factor = rule.cut_area_factor.unwrap_or(area_factor);
            let (cut_factor, diff_cut_factor) = if rule.area_factor_diff_only {
                (1.0, cut_area_factor)
            } else {
                (cut_area_factor, cut_area_factor)
            };

            let side_factor = rule.side_area_factor;
            let (side_metal_factor, diff_side_metal_factor) = if rule.side_area_factor_diff_only {
                (1.0, side_factor)
            } else {
                (side_factor, side_factor)
            };

            if side_factor != 0.0 && layer.thickness == 0.0 {
                log::warn!(
                    "layer {} defines a side-area antenna rule but has zero thickness; side area will be zero",
                    layer.name
                );
            }

            models.insert(
                layer.id,
                AntennaModel {
                    metal_factor,
                    diff_metal_factor,
                    cut_factor,
                    diff_cut_factor,
                    side_metal_factor,
                    diff_side_metal_factor,
                    minus_diff_factor: rule.minus_diff_factor,
                    plus_diff_factor: rule.plus_diff_factor,
                },
            );
        }
        Self { models }
    }

    /// `None` means the layer has no default antenna rule (`RuleGap`):
    /// normal for top layers and the substrate, silently not checked.
    pub fn model(&self, layer: LayerId) -> Option<&AntennaModel> {
        self.models.get(&layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer::{AntennaRule, Dir, Layer};

    fn layer_with_rule(rule: AntennaRule, thickness: f64) -> Layer {
        Layer {
            id: 1,
            name: "M1".into(),
            routing_level: 1,
            dir: Dir::Horizontal,
            width: 1.0,
            thickness,
            rule: Some(rule),
            lower: None,
            upper: None,
        }
    }

    #[test]
    fn diffusion_use_only_leaves_plain_factors_at_one() {
        let rule = AntennaRule { area_factor: 3.0, area_factor_diff_only: true, ..Default::default() };
        let design = Design::new(vec![layer_with_rule(rule, 1.0)], vec![], 1000.0);
        let store = RuleStore::build(&design);
        let model = store.model(1).unwrap();
        assert_eq!(model.metal_factor, 1.0);
        assert_eq!(model.diff_metal_factor, 3.0);
    }

    #[test]
    fn non_diff_only_factor_applies_to_both_pairs() {
        let rule = AntennaRule { area_factor: 2.0, ..Default::default() };
        let design = Design::new(vec![layer_with_rule(rule, 1.0)], vec![], 1000.0);
        let store = RuleStore::build(&design);
        let model = store.model(1).unwrap();
        assert_eq!(model.metal_factor, 2.0);
        assert_eq!(model.diff_metal_factor, 2.0);
    }

    #[test]
    fn layer_with_no_rule_has_no_model() {
        let layer = Layer {
            id: 2,
            name: "M2".into(),
            routing_level: 1,
            dir: Dir::Horizontal,
            width: 1.0,
            thickness: 1.0,
            rule: None,
            lower: None,
            upper: None,
        };
        let design = Design::new(vec![layer], vec![], 1000.0);
        let store = RuleStore::build(&design);
        assert!(store.model(2).is_none());
    }
}
