//! Property tests for the filter-aggregate pipeline

use proptest::prelude::*;
use tablero::aggregate::{distribution, group_sum};
use tablero::{apply, options, summarize, Dashboard, Dataset, Dimension, FilterSelection, Record, View};

const CITIES: [&str; 4] = ["Bogotá", "Medellín", "Cali", "Pasto"];
const PARTNERS: [&str; 3] = ["A", "B", "C"];
const REGIONS: [&str; 3] = ["Centro", "Antioquia", "Valle"];

/// Records where analisis never exceeds total_po
fn record() -> impl Strategy<Value = Record> {
    (0u64..5_000, 0usize..4, 0usize..3, 0usize..3).prop_flat_map(|(total, c, a, r)| {
        (0..=total).prop_map(move |analisis| {
            Record::new(analisis, total, CITIES[c], PARTNERS[a], REGIONS[r])
        })
    })
}

fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(record(), 0..40).prop_map(|records| Dataset::new(records, "prop"))
}

fn value_set(pool: &'static [&'static str]) -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(pool.to_vec(), 0..=pool.len())
}

fn selection() -> impl Strategy<Value = FilterSelection> {
    (value_set(&CITIES), value_set(&PARTNERS), value_set(&REGIONS)).prop_map(|(c, a, r)| {
        let mut s = FilterSelection::none();
        for v in c {
            s.insert(Dimension::Ciudad, v);
        }
        for v in a {
            s.insert(Dimension::Aliado, v);
        }
        for v in r {
            s.insert(Dimension::Region, v);
        }
        s
    })
}

proptest! {
    #[test]
    fn filtered_totals_never_exceed_base(ds in dataset(), sel in selection()) {
        let base = summarize(&View::all(&ds)).unwrap();
        let view = summarize(&apply(&ds, &sel)).unwrap();
        prop_assert!(view.analyzed_total <= base.analyzed_total);
        prop_assert!(view.target_total <= base.target_total);
    }

    #[test]
    fn percentage_is_bounded(ds in dataset(), sel in selection()) {
        let s = summarize(&apply(&ds, &sel)).unwrap();
        prop_assert!(s.percentage >= 0.0 && s.percentage <= 100.0);
        if s.target_total == 0 {
            prop_assert_eq!(s.percentage, 0.0);
        }
    }

    #[test]
    fn empty_selection_is_identity(ds in dataset()) {
        prop_assert_eq!(apply(&ds, &FilterSelection::none()), View::all(&ds));
    }

    #[test]
    fn filtering_is_idempotent(ds in dataset(), sel in selection()) {
        let once = apply(&ds, &sel);
        let refiltered = Dataset::new(once.records().iter().map(|r| (*r).clone()).collect(), "view");
        let twice = apply(&refiltered, &sel);
        prop_assert_eq!(once.records(), twice.records());
    }

    #[test]
    fn options_ignore_selection(ds in dataset(), sel in selection()) {
        let dashboard = Dashboard::new(ds.clone());
        let update = dashboard.render(&sel);
        prop_assert_eq!(update.options, dashboard.options());
        for dim in Dimension::ALL {
            let values = options(&ds, dim);
            let mut sorted = values.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(values, sorted);
        }
    }

    #[test]
    fn group_sums_add_up(ds in dataset(), sel in selection()) {
        let view = apply(&ds, &sel);
        let analyzed = summarize(&view).unwrap().analyzed_total;
        for dim in Dimension::ALL {
            prop_assert_eq!(group_sum(&view, dim).unwrap().total().unwrap(), analyzed);
        }
    }

    #[test]
    fn group_keys_come_from_view(ds in dataset(), sel in selection()) {
        let view = apply(&ds, &sel);
        let result = group_sum(&view, Dimension::Ciudad).unwrap();
        for g in &result.groups {
            prop_assert!(view.records().iter().any(|r| r.ciudad == g.key));
        }
    }

    #[test]
    fn shares_sum_to_hundred_or_zero(ds in dataset(), sel in selection()) {
        let view = apply(&ds, &sel);
        let result = distribution(&view, Dimension::Aliado).unwrap();
        let total: f64 = result.groups.iter().map(|g| g.share.unwrap_or(0.0)).sum();
        if result.total().unwrap() == 0 {
            prop_assert_eq!(total, 0.0);
        } else {
            prop_assert!((total - 100.0).abs() < 1e-6);
        }
    }
}

#[test]
fn scenario_no_filter() {
    let ds = Dataset::new(
        vec![
            Record::new(150, 1000, "Bogotá", "A", "Centro"),
            Record::new(200, 1200, "Medellín", "B", "Antioquia"),
            Record::new(180, 1500, "Cali", "C", "Valle"),
        ],
        "scenario",
    );
    let update = Dashboard::new(ds).render(&FilterSelection::none());
    assert_eq!(update.summary.target_total, 3700);
    assert_eq!(update.summary.analyzed_total, 530);
    assert!((update.summary.percentage - 14.324324).abs() < 1e-4);
}
