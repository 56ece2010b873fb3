//! Integration tests for loading the demo models.
use genplan::input::load_model;
use genplan::units::Dimensionless;
use rstest::rstest;

#[rstest]
#[case("demos/simple", false)]
#[case("demos/stochastic", true)]
fn test_load_demo_model(#[case] model_dir: &str, #[case] stochastic: bool) {
    let model = load_model(model_dir).unwrap();
    assert_eq!(model.portfolio.horizon(), 4);
    assert_eq!(model.portfolio.num_generators(), 3);
    assert_eq!(model.is_stochastic(), stochastic);

    let wind = &model.portfolio.generators()["Wind"];
    assert_eq!(wind.max_cf.get(2), Dimensionless(0.6));
}

#[test]
fn test_stochastic_demo_scenarios() {
    let model = load_model("demos/stochastic").unwrap();
    let scenarios = model.scenarios.unwrap();
    let ids: Vec<_> = scenarios.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, ["low_wind", "high_load"]);

    let low_wind = scenarios.iter().next().unwrap().apply(&model.portfolio).unwrap();
    assert_eq!(low_wind.generators()["Wind"].max_cf.get(1), Dimensionless(0.3));
    assert_eq!(low_wind.load()[0].value(), 360.0);
}
