//! Integration tests for requirement aggregation.
//!
//! These tests exercise the public planning API end to end: BOM
//! registration, explosion, merging and the validation/skip rules.

use std::collections::HashMap;

use common::{ItemId, LookupError};
use planning::{
    Bom, BomLine, InMemoryBomRegistry, PlannedItem, PlanningError, RequirementLine, aggregate,
};

/// Helper to build a registry with a small infusion-pump product family
fn create_registry() -> InMemoryBomRegistry {
    let mut registry = InMemoryBomRegistry::new();
    registry
        .register(
            Bom::new("BOM-PUMP-001", "INFUSION-PUMP")
                .as_default()
                .with_line(BomLine::new("MOTOR-12V", 1.0, "Nos"))
                .with_line(BomLine::new("HOUSING-ABS", 1.0, "Nos"))
                .with_line(BomLine::new("SCREW-M3", 12.0, "Nos")),
        )
        .unwrap();
    registry
        .register(
            Bom::new("BOM-DOCK-001", "PUMP-DOCK")
                .as_default()
                .with_line(BomLine::new("HOUSING-ABS", 2.0, "Nos"))
                .with_line(BomLine::new("SCREW-M3", 6.0, "Nos"))
                .with_line(BomLine::new("PSU-24V", 1.0, "Nos")),
        )
        .unwrap();
    registry
        .register(
            Bom::new("BOM-GEL-001", "CONDUCTIVE-GEL")
                .as_default()
                .with_line(BomLine::new("GLYCERIN", 0.25, "Kg")),
        )
        .unwrap();
    registry
}

fn as_map(lines: &[RequirementLine]) -> HashMap<String, f64> {
    lines
        .iter()
        .map(|l| (l.item_id.to_string(), l.total_quantity.value()))
        .collect()
}

mod scenarios {
    use super::*;

    #[test]
    fn single_level_explosion() {
        let mut registry = InMemoryBomRegistry::new();
        registry
            .register(
                Bom::new("BOM-A", "A")
                    .as_default()
                    .with_line(BomLine::new("X", 2.0, "Nos")),
            )
            .unwrap();

        let lines = aggregate(&[PlannedItem::new("A", 10.0)], &registry).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_id, ItemId::new("X"));
        assert_eq!(lines[0].total_quantity.value(), 20.0);
    }

    #[test]
    fn mixed_plan_merges_shared_components() {
        let planned = [
            PlannedItem::new("INFUSION-PUMP", 10.0),
            PlannedItem::new("PUMP-DOCK", 5.0),
            PlannedItem::new("CONDUCTIVE-GEL", 8.0),
        ];
        let lines = aggregate(&planned, &create_registry()).unwrap();

        let order: Vec<&str> = lines.iter().map(|l| l.item_id.as_str()).collect();
        assert_eq!(
            order,
            vec!["MOTOR-12V", "HOUSING-ABS", "SCREW-M3", "PSU-24V", "GLYCERIN"]
        );

        let totals = as_map(&lines);
        assert_eq!(totals["HOUSING-ABS"], 10.0 + 10.0);
        assert_eq!(totals["SCREW-M3"], 120.0 + 30.0);
        assert_eq!(totals["GLYCERIN"], 2.0);
    }

    #[test]
    fn repeated_planned_item_is_summed() {
        let planned = [
            PlannedItem::new("CONDUCTIVE-GEL", 4.0),
            PlannedItem::new("CONDUCTIVE-GEL", 12.0),
        ];
        let lines = aggregate(&planned, &create_registry()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].total_quantity.value(), 0.25 * 4.0 + 0.25 * 12.0);
    }
}

mod laws {
    use super::*;

    #[test]
    fn permutations_give_same_item_quantity_mapping() {
        let registry = create_registry();
        let base = vec![
            PlannedItem::new("INFUSION-PUMP", 3.0),
            PlannedItem::new("PUMP-DOCK", 7.0),
            PlannedItem::new("CONDUCTIVE-GEL", 2.0),
            PlannedItem::new("UNKNOWN-ITEM", 1.0),
        ];
        let expected = as_map(&aggregate(&base, &registry).unwrap());

        let permutations: [[usize; 4]; 5] = [
            [3, 2, 1, 0],
            [1, 0, 3, 2],
            [2, 3, 0, 1],
            [0, 2, 1, 3],
            [1, 3, 2, 0],
        ];
        for perm in permutations {
            let shuffled: Vec<PlannedItem> = perm.iter().map(|&i| base[i].clone()).collect();
            let lines = aggregate(&shuffled, &registry).unwrap();
            assert_eq!(lines.len(), expected.len());
            assert_eq!(as_map(&lines), expected, "permutation {perm:?}");
        }
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let registry = create_registry();
        let planned = [
            PlannedItem::new("PUMP-DOCK", 7.0),
            PlannedItem::new("INFUSION-PUMP", 3.0),
        ];
        let first = aggregate(&planned, &registry).unwrap();
        let second = aggregate(&planned, &registry).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn contribution_is_quantity_times_per_unit() {
        let registry = create_registry();
        let (q1, q2, per_unit) = (3.0, 7.0, 12.0);
        let lines = aggregate(
            &[
                PlannedItem::new("INFUSION-PUMP", q1),
                PlannedItem::new("INFUSION-PUMP", q2),
            ],
            &registry,
        )
        .unwrap();
        assert_eq!(as_map(&lines)["SCREW-M3"], q1 * per_unit + q2 * per_unit);
    }

    #[test]
    fn unresolved_bom_is_skipped_but_bad_quantity_fails() {
        let registry = create_registry();

        let skipped = aggregate(&[PlannedItem::new("SPARE-PART", 3.0)], &registry).unwrap();
        assert!(skipped.is_empty());

        let err = aggregate(&[PlannedItem::new("SPARE-PART", 0.0)], &registry).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidQuantity { .. }));

        let err = aggregate(&[PlannedItem::new("INFUSION-PUMP", -1.0)], &registry).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidQuantity { .. }));
    }

    #[test]
    fn quantities_are_never_negative() {
        let lines = aggregate(
            &[
                PlannedItem::new("INFUSION-PUMP", 0.5),
                PlannedItem::new("PUMP-DOCK", 1.0),
            ],
            &create_registry(),
        )
        .unwrap();
        assert!(lines.iter().all(|l| l.total_quantity.value() >= 0.0));
    }
}

mod collaborators {
    use super::*;

    #[test]
    fn lookup_error_is_not_replaced_by_zero() {
        let lookup = |item: &ItemId| -> Result<Option<Bom>, LookupError> {
            if item.as_str() == "PUMP-DOCK" {
                Err(LookupError::backend("deadlock detected"))
            } else {
                Ok(None)
            }
        };

        let err = aggregate(
            &[
                PlannedItem::new("INFUSION-PUMP", 1.0),
                PlannedItem::new("PUMP-DOCK", 1.0),
            ],
            &lookup,
        )
        .unwrap_err();

        assert!(matches!(err, PlanningError::Collaborator(_)));
    }

    #[test]
    fn malformed_bom_from_store_is_rejected() {
        let lookup = |item: &ItemId| -> Result<Option<Bom>, LookupError> {
            Ok(Some(
                Bom::new("BOM-BROKEN", item.clone())
                    .with_line(BomLine::new("PART", -2.0, "Nos")),
            ))
        };
        let err = aggregate(&[PlannedItem::new("A", 1.0)], &lookup).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidBom { .. }));
    }
}

mod observability {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tracing_subscriber::EnvFilter;

    use super::*;

    #[test]
    fn aggregation_records_metrics() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let registry = create_registry();

        let lines = metrics::with_local_recorder(&recorder, || {
            aggregate(
                &[
                    PlannedItem::new("INFUSION-PUMP", 2.0),
                    PlannedItem::new("PUMP-DOCK", 1.0),
                ],
                &registry,
            )
        })
        .unwrap();
        assert_eq!(lines.len(), 4);

        let rendered = handle.render();
        assert!(rendered.contains("mrp_aggregations_total"));
        assert!(rendered.contains("mrp_requirement_lines"));
    }

    #[test]
    fn skipped_items_log_without_failing() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("planning=debug"))
            .with_test_writer()
            .finish();
        let registry = create_registry();

        let lines = tracing::subscriber::with_default(subscriber, || {
            aggregate(
                &[
                    PlannedItem::new("SPARE-FUSE", 5.0),
                    PlannedItem::new("CONDUCTIVE-GEL", 4.0),
                ],
                &registry,
            )
        })
        .unwrap();

        assert_eq!(as_map(&lines).get("GLYCERIN"), Some(&1.0));
    }
}
