//! Tests for ParameterAdapter with the cavity model

use ndarray::Array1;
use trmc_rs::cavity::{CavityConfig, CavityModel};
use trmc_rs::parameters::{Parameter, ParameterAdapter, ParameterList};
use trmc_rs::session::default_parameters;
use trmc_rs::TrmcError;

fn cavity_adapter() -> ParameterAdapter<CavityModel> {
    let config = CavityConfig::x_band();
    ParameterAdapter::with_parameters(CavityModel::new(config), default_parameters(&config).unwrap())
}

#[test]
fn test_reduced_count_follows_edits() {
    let mut adapter = cavity_adapter();
    assert_eq!(adapter.reduced_values().len(), 3);

    adapter.unfix("d1").unwrap();
    adapter.unfix("layer_sig").unwrap();
    assert_eq!(adapter.reduced_values().len(), 5);
    assert_eq!(adapter.reduced_count(), 5);

    adapter.fix("d_iris").unwrap();
    adapter.set("loss_fac", 2e-7, Some(true)).unwrap();
    assert_eq!(adapter.reduced_values().len(), 3);

    // fixing twice changes nothing
    adapter.fix("d_iris").unwrap();
    assert_eq!(adapter.reduced_values().len(), 3);
}

#[test]
fn test_reduced_values_in_declaration_order() {
    let mut adapter = cavity_adapter();
    adapter.unfix("sub_sig").unwrap();
    let free: Vec<&str> = adapter.parameters().free().map(|p| p.name()).collect();
    assert_eq!(free, vec!["d_iris", "loss_fac", "sub_epsr", "sub_sig"]);
    assert_eq!(adapter.reduced_values(), vec![9.6, 1e-7, 3.6, 0.0]);
}

#[test]
fn test_invoke_with_stored_values_matches_calc() {
    let adapter = cavity_adapter();
    let f = Array1::range(8.3, 8.7, 0.01);
    let via_reduced = adapter
        .invoke_model(&f, &adapter.reduced_values())
        .unwrap();
    assert_eq!(via_reduced, adapter.calc(&f).unwrap());
    assert_eq!(via_reduced, CavityConfig::x_band().reflectance_sweep(&f));
}

#[test]
fn test_invoke_does_not_store_values() {
    let adapter = cavity_adapter();
    let f = Array1::from(vec![8.5]);
    let moved = adapter.invoke_model(&f, &[9.0, 1e-7, 3.6]).unwrap();
    assert_ne!(moved, adapter.calc(&f).unwrap());
    assert_eq!(adapter.value("d_iris").unwrap(), 9.6);
}

#[test]
fn test_invoke_wrong_length() {
    let adapter = cavity_adapter();
    let f = Array1::from(vec![8.5]);
    for n in [0, 2, 4, 11] {
        let reduced = vec![1.0; n];
        assert!(matches!(
            adapter.invoke_model(&f, &reduced),
            Err(TrmcError::ArityMismatch { expected: 3, .. })
        ));
    }
}

#[test]
fn test_model_arity_is_checked() {
    let mut list = ParameterList::new();
    list.add("d1", 36.0, false).unwrap();
    let adapter = ParameterAdapter::with_parameters(CavityModel::default(), list);
    let err = adapter.calc(&Array1::from(vec![8.5]));
    assert!(matches!(
        err,
        Err(TrmcError::ArityMismatch {
            expected: 11,
            got: 1
        })
    ));
}

#[test]
fn test_for_model_names() {
    let adapter = ParameterAdapter::for_model(CavityModel::default()).unwrap();
    assert_eq!(adapter.parameters().names(), CavityModel::PARAMETERS.to_vec());
    assert!(adapter.parameters().iter().all(|p| !p.is_fixed() && p.value() == 0.0));
}

#[test]
fn test_unknown_and_duplicate_names() {
    let mut adapter = cavity_adapter();
    assert!(matches!(
        adapter.set("d3", 1.0, None),
        Err(TrmcError::ParameterNotFound(_))
    ));
    assert!(matches!(
        adapter.fix("iris"),
        Err(TrmcError::ParameterNotFound(_))
    ));
    assert!(matches!(
        adapter.push(Parameter::new("d1", 1.0, true)),
        Err(TrmcError::DuplicateName(_))
    ));
}

#[test]
fn test_json_round_trip_keeps_fixed_flags() {
    let adapter = cavity_adapter();
    let json = adapter.parameters().to_json().unwrap();
    let restored = ParameterList::from_json(&json).unwrap();
    assert_eq!(&restored, adapter.parameters());
    assert_eq!(restored.reduced_values(), adapter.reduced_values());
}
