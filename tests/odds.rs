use scoreline::EngineError;
use scoreline::odds::{
    MarginResult, OddsQuote, ValueRule, implied_probability, normalize_three, overround,
    value_margin,
};

#[test]
fn implied_probability_examples() {
    assert_eq!(implied_probability(2.0).unwrap(), 0.5);
    assert_eq!(implied_probability(2.50).unwrap(), 0.40);
}

#[test]
fn margin_example() {
    let margin = value_margin(0.45, 2.50).unwrap();
    assert!((margin - 0.05).abs() < 1e-12);
}

#[test]
fn odds_not_above_one_fail() {
    assert!(matches!(
        implied_probability(0.9),
        Err(EngineError::InvalidArgument { name: "odds", .. })
    ));
    assert!(implied_probability(1.0).is_err());
    assert!(OddsQuote::new(1.0).is_err());
}

#[test]
fn normalized_probabilities_sum_to_one() {
    let books = [
        (1.50, 4.00, 7.00),
        (2.10, 3.30, 3.60),
        (1.01, 21.0, 51.0),
        (3.0, 3.0, 3.0),
        (1.9, 1.9, 1.9),
    ];
    for (h, d, a) in books {
        let [ph, pd, pa] = normalize_three(h, d, a).unwrap();
        assert!((ph + pd + pa - 1.0).abs() < 1e-12, "{h} {d} {a}");
    }
}

#[test]
fn fair_book_has_no_overround() {
    let quotes = [3.0, 3.0, 3.0].map(|o| OddsQuote::new(o).unwrap());
    assert!(overround(&quotes).abs() < 1e-12);
}

#[test]
fn threshold_is_a_caller_choice() {
    let m = MarginResult::compute(0.45, 2.50).unwrap();
    assert!(ValueRule::STRICT.is_value(&m));
    assert!(!ValueRule::new(0.06).unwrap().is_value(&m));
    assert!(ValueRule::new(0.04).unwrap().is_value(&m));
}
